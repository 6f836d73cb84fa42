//! `imgsnag download` – download references in order.

use anyhow::{bail, Context, Result};
use imgsnag_core::config::SnagConfig;
use imgsnag_core::naming::NamingParameters;
use imgsnag_core::orchestrator::{batch_items, BatchItem, BatchReport, DownloadOutcome};
use std::path::Path;

use crate::cli::{build_orchestrator, default_base_name, SaveArgs};

/// Reference lines from a file: blank lines and `#` comments are skipped.
pub(crate) fn read_reference_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

/// One slot per requested string. Unusable ones are reported on stderr but
/// keep their position, so later files keep their numbers.
pub(crate) fn requested_items(raw: Vec<String>) -> Vec<BatchItem> {
    let items = batch_items(raw);
    for bad in items.iter().filter_map(|i| i.as_ref().err()) {
        eprintln!("skipping {bad:?}: not an absolute URL or data: URL");
    }
    items
}

pub(crate) fn naming_from(save: &SaveArgs) -> NamingParameters {
    NamingParameters::new(
        save.name.clone().unwrap_or_else(default_base_name),
        save.folder.clone().unwrap_or_default(),
    )
}

/// Runs one batch and prints a line per job.
pub(crate) async fn download_batch(
    cfg: &SnagConfig,
    items: Vec<BatchItem>,
    save: &SaveArgs,
) -> Result<BatchReport> {
    if items.is_empty() {
        bail!("no references provided");
    }
    let (orchestrator, root) =
        build_orchestrator(cfg, save.dir.as_deref(), save.timeout_secs).await?;
    let params = naming_from(save);
    println!("Downloading {} file(s) into {}", items.len(), root.display());
    let report = orchestrator.run_items(items, &params).await;
    print_report(&report);
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for job in &report.jobs {
        let note = match (&job.error, job.outcome) {
            (Some(e), _) => format!("  ({e})"),
            (None, DownloadOutcome::Timeout) => "  (may still finish)".to_string(),
            _ => String::new(),
        };
        println!(
            "{:>4}  {:<11} {}{}",
            job.ordinal,
            job.outcome.as_str(),
            job.target_path,
            note
        );
    }
    println!(
        "{} of {} complete",
        report.completed(),
        report.jobs.len()
    );
}

pub async fn run_download(
    cfg: &SnagConfig,
    mut references: Vec<String>,
    from: Option<&Path>,
    save: &SaveArgs,
) -> Result<()> {
    if let Some(path) = from {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read references from {}", path.display()))?;
        references.extend(read_reference_lines(&text));
    }
    download_batch(cfg, requested_items(references), save).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_file_lines() {
        let text = "# saved from gallery\nhttps://a/1.png\n\n  https://a/2.png  \n#x\n";
        assert_eq!(
            read_reference_lines(text),
            vec!["https://a/1.png", "https://a/2.png"]
        );
    }

    #[test]
    fn unusable_references_keep_their_slot() {
        let items = requested_items(vec![
            "https://a/1.png".into(),
            "blob:https://a/2".into(),
            "relative/3.png".into(),
            "data:image/png;base64,AA".into(),
        ]);
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].as_ref().map(|r| r.as_str()), Ok("https://a/1.png"));
        assert_eq!(items[1], Err("blob:https://a/2".to_string()));
        assert_eq!(items[2], Err("relative/3.png".to_string()));
        assert_eq!(
            items[3].as_ref().map(|r| r.as_str()),
            Ok("data:image/png;base64,AA")
        );
    }

    #[test]
    fn default_name_is_random_token() {
        let params = naming_from(&SaveArgs::default());
        assert_eq!(params.base_name.len(), 32);
        assert!(params.base_name.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(params.subfolder, "");
    }
}
