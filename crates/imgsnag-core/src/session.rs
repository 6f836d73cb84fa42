//! A page session: one document, one orchestrator, request in, response out.

use anyhow::Result;
use std::path::PathBuf;

use crate::document::Document;
use crate::extract::{collect, CollectOptions, ExtractionResult};
use crate::naming::NamingParameters;
use crate::orchestrator::{batch_items, Orchestrator};
use crate::protocol::{CollectRequest, DownloadRequest, DownloadResponse, Request, Response};

/// Default socket for `imgsnag serve`: `~/.local/state/imgsnag/session.sock`.
pub fn default_socket_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsnag")?;
    Ok(xdg_dirs.place_state_file("session.sock")?)
}

pub struct Session {
    document: Box<dyn Document + Send + Sync>,
    orchestrator: Orchestrator,
    options: CollectOptions,
}

impl Session {
    pub fn new(
        document: Box<dyn Document + Send + Sync>,
        orchestrator: Orchestrator,
        options: CollectOptions,
    ) -> Self {
        Self {
            document,
            orchestrator,
            options,
        }
    }

    /// Answers one request. Download batches are spawned on the current
    /// runtime and keep running after the reply.
    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::CollectImages(req) => Response::Collect(self.collect(&req)),
            Request::DownloadImages(req) => Response::Download(self.download(req)),
        }
    }

    /// Parses one JSON request and serializes the reply.
    pub fn handle_json(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::debug!("bad request: {}", e);
                Response::Error {
                    error: format!("invalid request: {}", e),
                }
            }
        };
        serde_json::to_string(&response)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialize response: {}"}}"#, e))
    }

    fn collect(&self, req: &CollectRequest) -> ExtractionResult {
        let options = self
            .options
            .clone()
            .with_background_images(req.include_background_images);
        collect(self.document.as_ref(), &options)
    }

    fn download(&self, req: DownloadRequest) -> DownloadResponse {
        let items = batch_items(req.references);
        let params = NamingParameters::new(req.base_name, req.subfolder);
        // The batch handle is dropped; the task runs to completion on its own.
        let (response, _handle) = self.orchestrator.spawn(items, params);
        response
    }
}
