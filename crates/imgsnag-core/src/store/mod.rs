//! Storage write service: the seam between the orchestrator and disk.
//!
//! The orchestrator only sees [`WriteService`]: submit a write, query its
//! state, and subscribe to state changes through a [`StateRegistry`].
//! [`LocalStore`] is the built-in implementation that fetches HTTP(S) and
//! `data:` locators into a download root with a uniquify-on-conflict policy.

mod data_url;
mod fetch;
mod local;
mod registry;
mod uniquify;

pub use data_url::{decode_data_url, DataUrlError};
pub use fetch::{FetchError, FetchOptions};
pub use local::LocalStore;
pub use registry::{StateRegistry, Subscription};
pub use uniquify::unique_filename_among;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the write service to one submitted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriteId(pub u64);

impl fmt::Display for WriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a write as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteState {
    InProgress,
    Complete,
    Interrupted,
}

impl WriteState {
    /// No further notifications follow a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, WriteState::Complete | WriteState::Interrupted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteState::InProgress => "in_progress",
            WriteState::Complete => "complete",
            WriteState::Interrupted => "interrupted",
        }
    }
}

/// What to do when the target path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Rename the new file (`name (1).ext`) instead of overwriting.
    #[default]
    Uniquify,
    Overwrite,
}

/// One write submitted to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Absolute URL or `data:` payload to persist.
    pub locator: String,
    /// Path relative to the service's root, `/`-separated.
    pub desired_path: String,
    pub conflict: ConflictPolicy,
    /// Ask the user where to save. The orchestrator always sends `false`.
    pub prompt: bool,
}

/// The service refused or failed to start a write.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("unsupported locator scheme: {0}")]
    UnsupportedScheme(String),
    #[error("unsafe target path: {0:?}")]
    UnsafePath(String),
    #[error("interactive save prompts are not supported")]
    PromptUnsupported,
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// A storage layer that accepts writes and reports their progress.
///
/// Writes run independently of the caller; completion is observed through
/// [`WriteService::query_state`] or a [`Subscription`] from the registry.
#[async_trait]
pub trait WriteService: Send + Sync {
    /// Starts a write and returns its id once the service has accepted it.
    async fn submit(&self, request: WriteRequest) -> Result<WriteId, SubmitError>;

    /// Current state of a write, or `None` if the service does not know it.
    async fn query_state(&self, id: WriteId) -> Option<WriteState>;

    /// Registry on which this service publishes state changes.
    fn registry(&self) -> &StateRegistry;
}
