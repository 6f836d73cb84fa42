//! Sequential download orchestration.
//!
//! Submits one write at a time to a [`WriteService`] and waits for it to
//! reach a terminal state (or time out) before submitting the next. Failures
//! are per job: a rejected submission, an interrupted write or a timeout is
//! recorded and the batch moves on.

mod job;
#[cfg(test)]
pub(crate) mod testing;
mod wait;

pub use job::{DownloadJob, JobRecord};
pub use wait::{wait_for_terminal, Detection, Settlement};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::history::HistoryDb;
use crate::naming::NamingParameters;
use crate::protocol::DownloadResponse;
use crate::reference::ImageReference;
use crate::store::{WriteService, WriteState};

/// One requested slot of a batch: a usable reference, or the raw string that
/// could not be used. Either way the slot keeps its ordinal.
pub type BatchItem = Result<ImageReference, String>;

/// Converts requested strings into batch slots, in order.
pub fn batch_items(raw: impl IntoIterator<Item = String>) -> Vec<BatchItem> {
    raw.into_iter().map(ImageReference::try_from).collect()
}

/// Default bound on waiting for one write's terminal state.
pub const DEFAULT_TERMINAL_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Terminal result of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadOutcome {
    Complete,
    Interrupted,
    /// No terminal state observed in time; the write may still finish later.
    Timeout,
}

impl DownloadOutcome {
    pub fn from_terminal(state: WriteState) -> Option<Self> {
        match state {
            WriteState::Complete => Some(DownloadOutcome::Complete),
            WriteState::Interrupted => Some(DownloadOutcome::Interrupted),
            WriteState::InProgress => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DownloadOutcome::Complete => "complete",
            DownloadOutcome::Interrupted => "interrupted",
            DownloadOutcome::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown download outcome: {0:?}")]
pub struct UnknownOutcome(pub String);

impl FromStr for DownloadOutcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(DownloadOutcome::Complete),
            "interrupted" => Ok(DownloadOutcome::Interrupted),
            "timeout" => Ok(DownloadOutcome::Timeout),
            other => Err(UnknownOutcome(other.to_string())),
        }
    }
}

/// Per-job records of a finished batch, in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub jobs: Vec<JobRecord>,
}

impl BatchReport {
    pub fn count(&self, outcome: DownloadOutcome) -> usize {
        self.jobs.iter().filter(|j| j.outcome == outcome).count()
    }

    pub fn completed(&self) -> usize {
        self.count(DownloadOutcome::Complete)
    }
}

/// Runs batches of downloads against one write service.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn WriteService>,
    timeout: Duration,
    history: Option<HistoryDb>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn WriteService>) -> Self {
        Self {
            store,
            timeout: DEFAULT_TERMINAL_TIMEOUT,
            history: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record every job outcome in `history`.
    pub fn with_history(mut self, history: HistoryDb) -> Self {
        self.history = Some(history);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Downloads `references` in order, one at a time.
    ///
    /// Job `i` (1-based) is named `base-i.ext` and is not submitted before
    /// job `i - 1` is done.
    pub async fn run(&self, references: Vec<ImageReference>, params: &NamingParameters) -> BatchReport {
        let items = references.into_iter().map(Ok).collect();
        self.run_items(items, params).await
    }

    /// Like [`run`](Self::run), but unusable slots are kept in place: each
    /// is recorded as interrupted under its own ordinal without being
    /// submitted, and later jobs keep their positions.
    pub async fn run_items(
        &self,
        items: Vec<BatchItem>,
        params: &NamingParameters,
    ) -> BatchReport {
        let params = params.sanitized();
        let batch_id = self.begin_history(&params, items.len()).await;
        tracing::info!(
            count = items.len(),
            base = %params.base_name,
            folder = %params.subfolder,
            "starting download batch"
        );

        let mut report = BatchReport::default();
        for (i, item) in items.into_iter().enumerate() {
            let ordinal = i + 1;
            let record = match item {
                Ok(reference) => {
                    let job = DownloadJob::new(reference, ordinal, &params);
                    job::run_job(&self.store, job, self.timeout).await
                }
                Err(raw) => job::unusable(raw, ordinal, &params),
            };
            self.record_history(batch_id, &record).await;
            report.jobs.push(record);
        }

        self.finish_history(batch_id).await;
        tracing::info!(
            complete = report.count(DownloadOutcome::Complete),
            interrupted = report.count(DownloadOutcome::Interrupted),
            timeout = report.count(DownloadOutcome::Timeout),
            "download batch finished"
        );
        report
    }

    /// Starts a batch in the background and answers immediately.
    ///
    /// Any non-empty request is accepted with `count` equal to its length,
    /// unusable slots included. An empty batch is rejected and nothing is
    /// spawned.
    pub fn spawn(
        &self,
        items: Vec<BatchItem>,
        params: NamingParameters,
    ) -> (DownloadResponse, Option<tokio::task::JoinHandle<BatchReport>>) {
        if items.is_empty() {
            return (DownloadResponse::rejected("no references provided"), None);
        }
        let count = items.len();
        let this = self.clone();
        let handle = tokio::spawn(async move { this.run_items(items, &params).await });
        (DownloadResponse::accepted(count), Some(handle))
    }

    async fn begin_history(&self, params: &NamingParameters, count: usize) -> Option<i64> {
        let db = self.history.as_ref()?;
        match db.begin_batch(params, count).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("could not record batch in history: {:#}", e);
                None
            }
        }
    }

    async fn record_history(&self, batch_id: Option<i64>, record: &JobRecord) {
        let (Some(db), Some(batch_id)) = (self.history.as_ref(), batch_id) else {
            return;
        };
        if let Err(e) = db.record_job(batch_id, record).await {
            tracing::warn!(ordinal = record.ordinal, "could not record job in history: {:#}", e);
        }
    }

    async fn finish_history(&self, batch_id: Option<i64>) {
        let (Some(db), Some(batch_id)) = (self.history.as_ref(), batch_id) else {
            return;
        };
        if let Err(e) = db.finish_batch(batch_id).await {
            tracing::warn!("could not finish batch in history: {:#}", e);
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("timeout", &self.timeout)
            .field("history", &self.history.is_some())
            .finish()
    }
}
