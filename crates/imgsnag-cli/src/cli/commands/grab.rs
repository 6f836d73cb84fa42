//! `imgsnag grab` – collect, select, download.

use anyhow::Result;
use imgsnag_core::config::SnagConfig;
use std::path::Path;

use super::collect::{collect_from, print_references};
use super::download::download_batch;
use crate::cli::selection::parse_selection;
use crate::cli::SaveArgs;

pub async fn run_grab(
    cfg: &SnagConfig,
    source: &Path,
    base_url: Option<&str>,
    background: bool,
    select: Option<&str>,
    save: &SaveArgs,
) -> Result<()> {
    let result = collect_from(cfg, source, base_url, background)?;
    print_references(&result);
    let references: Vec<_> = match select {
        Some(spec) => parse_selection(spec, result.references.len())?
            .into_iter()
            .map(|i| result.references[i].clone())
            .collect(),
        None => result.references,
    };
    download_batch(cfg, references.into_iter().map(Ok).collect(), save).await?;
    Ok(())
}
