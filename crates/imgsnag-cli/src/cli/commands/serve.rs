//! `imgsnag serve` – answer page requests over a Unix socket until Ctrl-C.

use anyhow::{Context, Result};
use imgsnag_core::config::SnagConfig;
use imgsnag_core::document;
use imgsnag_core::session::{default_socket_path, Session};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::build_orchestrator;
use crate::cli::serve_socket::spawn_session_listener;

pub async fn run_serve(
    cfg: &SnagConfig,
    source: &Path,
    socket: Option<PathBuf>,
    base_url: Option<&str>,
    dir: Option<PathBuf>,
) -> Result<()> {
    let doc = document::open(source, base_url)?;
    let (orchestrator, root) = build_orchestrator(cfg, dir.as_deref(), None).await?;
    let session = Arc::new(Session::new(Box::new(doc), orchestrator, cfg.collect_options()));

    let socket = match socket {
        Some(p) => p,
        None => default_socket_path()?,
    };
    let server = spawn_session_listener(session, &socket)?;
    tracing::info!(socket = %socket.display(), root = %root.display(), "session serving");
    println!("Serving {} on {}", source.display(), socket.display());

    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
    server.abort();
    let _ = std::fs::remove_file(&socket);
    Ok(())
}
