//! JSON messages exchanged with a page session.
//!
//! Requests are tagged by `type` with the body under `payload`:
//!
//! ```json
//! {"type":"COLLECT_IMAGES","payload":{"includeBackgroundImages":true}}
//! {"type":"DOWNLOAD_IMAGES","payload":{"references":["https://…"],"baseName":"cat","subfolder":"trip"}}
//! ```

use serde::{Deserialize, Serialize};

use crate::extract::ExtractionResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    CollectImages(CollectRequest),
    DownloadImages(DownloadRequest),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    #[serde(default)]
    pub include_background_images: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub base_name: String,
    #[serde(default)]
    pub subfolder: String,
}

/// Immediate answer to a download request; the batch itself runs later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub accepted: bool,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadResponse {
    pub fn accepted(count: usize) -> Self {
        Self {
            accepted: true,
            count,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            accepted: false,
            count: 0,
            error: Some(error.into()),
        }
    }
}

/// Any reply a session can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Collect(ExtractionResult),
    Download(DownloadResponse),
    /// The request could not be parsed.
    Error { error: String },
}
