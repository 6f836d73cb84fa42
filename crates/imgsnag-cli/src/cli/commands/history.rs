//! `imgsnag history` – recent batches with outcome counts.

use anyhow::Result;
use imgsnag_core::history::HistoryDb;

pub async fn run_history(db: &HistoryDb, limit: u32) -> Result<()> {
    let batches = db.recent_batches(limit).await?;
    if batches.is_empty() {
        println!("No batches recorded.");
        return Ok(());
    }
    println!(
        "{:<6} {:<9} {:<9} {:<9} {:<9} {}",
        "ID", "REQUESTED", "COMPLETE", "FAILED", "TIMEOUT", "NAME"
    );
    for b in batches {
        let name = if b.subfolder.is_empty() {
            b.base_name.clone()
        } else {
            format!("{}/{}", b.subfolder, b.base_name)
        };
        let running = if b.finished_at.is_none() { " (unfinished)" } else { "" };
        println!(
            "{:<6} {:<9} {:<9} {:<9} {:<9} {}{}",
            b.id, b.requested, b.complete, b.interrupted, b.timeout, name, running
        );
    }
    Ok(())
}
