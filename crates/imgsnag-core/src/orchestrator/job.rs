//! One download job and its state machine.
//!
//! Pending → Submitted → AwaitingTerminal → Done. A submission failure goes
//! straight to Done with an interrupted outcome.

use std::sync::Arc;
use std::time::Duration;

use super::wait::{wait_for_terminal, Detection};
use super::DownloadOutcome;
use crate::naming::{self, NamingParameters};
use crate::reference::ImageReference;
use crate::store::{ConflictPolicy, WriteId, WriteRequest, WriteService};

/// A reference bound to its batch position and target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub reference: ImageReference,
    /// 1-based position in the batch.
    pub ordinal: usize,
    /// `[subfolder/]base-ordinal.ext`, relative to the storage root.
    pub target_path: String,
}

impl DownloadJob {
    /// `params` must already be sanitized.
    pub fn new(reference: ImageReference, ordinal: usize, params: &NamingParameters) -> Self {
        let target_path = naming::target_path(params, ordinal, reference.as_str());
        Self {
            reference,
            ordinal,
            target_path,
        }
    }

    fn write_request(&self) -> WriteRequest {
        WriteRequest {
            locator: self.reference.as_str().to_string(),
            desired_path: self.target_path.clone(),
            conflict: ConflictPolicy::Uniquify,
            prompt: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Submitted(WriteId),
    AwaitingTerminal(WriteId),
    Done(DownloadOutcome),
}

/// What happened to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub ordinal: usize,
    /// The reference as requested.
    pub reference: String,
    pub target_path: String,
    /// `None` when the service never accepted the write.
    pub write_id: Option<WriteId>,
    pub outcome: DownloadOutcome,
    /// Submission error text, if any.
    pub error: Option<String>,
}

/// Record for a slot whose string is not a usable reference. Nothing is
/// submitted; the slot still owns its ordinal and target name.
pub(super) fn unusable(raw: String, ordinal: usize, params: &NamingParameters) -> JobRecord {
    tracing::warn!(ordinal, reference = %raw, "not an absolute URL or data: URL; skipped");
    JobRecord {
        ordinal,
        target_path: naming::target_path(params, ordinal, &raw),
        reference: raw,
        write_id: None,
        outcome: DownloadOutcome::Interrupted,
        error: Some("unusable reference".to_string()),
    }
}

/// Drives one job to `Done`. Never fails: every path ends in an outcome.
pub(super) async fn run_job(
    store: &Arc<dyn WriteService>,
    job: DownloadJob,
    timeout: Duration,
) -> JobRecord {
    let mut phase = Phase::Pending;
    let mut write_id = None;
    let mut error = None;

    loop {
        phase = match phase {
            Phase::Pending => match store.submit(job.write_request()).await {
                Ok(id) => {
                    tracing::debug!(ordinal = job.ordinal, %id, path = %job.target_path, "submitted");
                    write_id = Some(id);
                    Phase::Submitted(id)
                }
                Err(e) => {
                    tracing::warn!(ordinal = job.ordinal, reference = %job.reference, "submission failed: {}", e);
                    error = Some(e.to_string());
                    Phase::Done(DownloadOutcome::Interrupted)
                }
            },
            Phase::Submitted(id) => Phase::AwaitingTerminal(id),
            Phase::AwaitingTerminal(id) => {
                let settlement = wait_for_terminal(Arc::clone(store), id, timeout).await;
                match (settlement.outcome, settlement.detected_by) {
                    (DownloadOutcome::Timeout, _) => tracing::warn!(
                        ordinal = job.ordinal,
                        %id,
                        reference = %job.reference,
                        "no terminal state within {:?}; moving on",
                        timeout
                    ),
                    (DownloadOutcome::Interrupted, _) => tracing::warn!(
                        ordinal = job.ordinal,
                        %id,
                        reference = %job.reference,
                        "write interrupted"
                    ),
                    (DownloadOutcome::Complete, Detection::Timeout) => tracing::debug!(
                        ordinal = job.ordinal,
                        %id,
                        "completion only seen by the final poll"
                    ),
                    (DownloadOutcome::Complete, _) => {}
                }
                Phase::Done(settlement.outcome)
            }
            Phase::Done(outcome) => {
                return JobRecord {
                    ordinal: job.ordinal,
                    reference: job.reference.into_string(),
                    target_path: job.target_path,
                    write_id,
                    outcome,
                    error,
                };
            }
        };
    }
}
