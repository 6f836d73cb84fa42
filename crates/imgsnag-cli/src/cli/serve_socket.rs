//! Session socket for `imgsnag serve`.
//! Protocol: one JSON request per line, one JSON response per line.

use anyhow::{Context, Result};
use imgsnag_core::session::Session;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

/// Binds `path` (replacing a stale socket) and answers each line with
/// `session.handle_json`. Runs until the task is dropped or aborted.
pub fn spawn_session_listener(
    session: Arc<Session>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)
        .with_context(|| format!("bind session socket {}", path.display()))?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let session = Arc::clone(&session);
                    tokio::spawn(async move {
                        let (read, mut write) = stream.into_split();
                        let mut reader = BufReader::new(read).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            let mut reply = session.handle_json(line);
                            reply.push('\n');
                            if let Err(e) = write.write_all(reply.as_bytes()).await {
                                tracing::debug!("session socket write: {}", e);
                                break;
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("session socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}
