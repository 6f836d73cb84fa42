//! `imgsnag collect` – list the image references of a page.

use anyhow::Result;
use imgsnag_core::config::SnagConfig;
use imgsnag_core::document;
use imgsnag_core::extract::{collect, ExtractionResult};
use std::path::Path;

/// Loads `source` and extracts its references with the configured options.
pub(crate) fn collect_from(
    cfg: &SnagConfig,
    source: &Path,
    base_url: Option<&str>,
    background: bool,
) -> Result<ExtractionResult> {
    let doc = document::open(source, base_url)?;
    let options = cfg
        .collect_options()
        .with_background_images(background || cfg.include_background_images);
    Ok(collect(&doc, &options))
}

pub(crate) fn print_references(result: &ExtractionResult) {
    for (i, r) in result.references.iter().enumerate() {
        println!("{:>4}  {}", i + 1, abbreviate(r.as_str(), 120));
    }
    if result.excluded_count > 0 {
        println!(
            "{} reference(s) excluded (only valid inside the page)",
            result.excluded_count
        );
    }
}

pub fn run_collect(
    cfg: &SnagConfig,
    source: &Path,
    base_url: Option<&str>,
    background: bool,
    json: bool,
) -> Result<()> {
    let result = collect_from(cfg, source, base_url, background)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.references.is_empty() {
        println!("No images found.");
        if result.excluded_count > 0 {
            println!("{} reference(s) excluded", result.excluded_count);
        }
    } else {
        print_references(&result);
    }
    Ok(())
}

/// Shortens long references (mostly data: URLs) for display.
fn abbreviate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}
