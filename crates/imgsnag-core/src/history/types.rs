//! Rows read back from the history database.

use crate::orchestrator::DownloadOutcome;

/// Batch identifier.
pub type BatchId = i64;

/// One batch with its outcome counts, used by the CLI `history` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub id: BatchId,
    pub base_name: String,
    pub subfolder: String,
    /// Number of references the batch was started with.
    pub requested: i64,
    pub created_at: i64,
    /// `None` while the batch is running (or if it never finished).
    pub finished_at: Option<i64>,
    pub complete: i64,
    pub interrupted: i64,
    pub timeout: i64,
}

impl BatchSummary {
    pub fn recorded(&self) -> i64 {
        self.complete + self.interrupted + self.timeout
    }
}

/// One recorded job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    pub ordinal: i64,
    pub reference: String,
    pub target_path: String,
    pub write_id: Option<i64>,
    pub outcome: DownloadOutcome,
    pub recorded_at: i64,
}
