//! CLI for imgsnag.

mod commands;
mod selection;
mod serve_socket;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgsnag_core::config::{self, SnagConfig};
use imgsnag_core::history::HistoryDb;
use imgsnag_core::orchestrator::Orchestrator;
use imgsnag_core::store::LocalStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use commands::{run_collect, run_download, run_grab, run_history, run_serve};

/// Top-level CLI for imgsnag.
#[derive(Debug, Parser)]
#[command(name = "imgsnag")]
#[command(about = "imgsnag: collect the images of a page and download them in order", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where and how downloaded files are named.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SaveArgs {
    /// Base file name; files become NAME-1.ext, NAME-2.ext, … (default: random).
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
    /// Subfolder of the download directory.
    #[arg(long, value_name = "NAME")]
    pub folder: Option<String>,
    /// Download directory (default: config `download_dir`, else current directory).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
    /// Seconds to wait for each file before moving on.
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the image references of a page snapshot (.json) or HTML file.
    Collect {
        /// Snapshot or HTML file.
        source: PathBuf,
        /// Document URL for an HTML file (relative references resolve against it).
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Also collect CSS background images.
        #[arg(long)]
        background: bool,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Download references in order.
    Download {
        /// Absolute URLs or data: URLs.
        references: Vec<String>,
        /// Read more references from FILE, one per line (`#` starts a comment).
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
        #[command(flatten)]
        save: SaveArgs,
    },

    /// Collect from a page, select by number, download.
    Grab {
        /// Snapshot or HTML file.
        source: PathBuf,
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        #[arg(long)]
        background: bool,
        /// 1-based indices and ranges, e.g. `1,3-5` (default: all).
        #[arg(long, value_name = "LIST")]
        select: Option<String>,
        #[command(flatten)]
        save: SaveArgs,
    },

    /// Answer JSON requests about a page over a Unix socket.
    Serve {
        /// Snapshot or HTML file.
        source: PathBuf,
        /// Socket path (default: state dir `session.sock`).
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Download directory.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Show recent download batches.
    History {
        /// Number of batches to show.
        #[arg(long, default_value = "10", value_name = "N")]
        limit: u32,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Collect {
                source,
                base_url,
                background,
                json,
            } => run_collect(&cfg, &source, base_url.as_deref(), background, json)?,
            CliCommand::Download {
                references,
                from,
                save,
            } => run_download(&cfg, references, from.as_deref(), &save).await?,
            CliCommand::Grab {
                source,
                base_url,
                background,
                select,
                save,
            } => {
                run_grab(
                    &cfg,
                    &source,
                    base_url.as_deref(),
                    background,
                    select.as_deref(),
                    &save,
                )
                .await?
            }
            CliCommand::Serve {
                source,
                socket,
                base_url,
                dir,
            } => run_serve(&cfg, &source, socket, base_url.as_deref(), dir).await?,
            CliCommand::History { limit } => {
                let db = HistoryDb::open_default().await?;
                run_history(&db, limit).await?
            }
        }

        Ok(())
    }
}

/// Base name for a batch when none is given: a random hyphenless UUID.
pub(crate) fn default_base_name() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Orchestrator writing under `dir` (or the configured root), recording history.
pub(crate) async fn build_orchestrator(
    cfg: &SnagConfig,
    dir: Option<&Path>,
    timeout_secs: Option<u64>,
) -> Result<(Orchestrator, PathBuf)> {
    let root = match dir {
        Some(d) => d.to_path_buf(),
        None => cfg.download_root()?,
    };
    std::fs::create_dir_all(&root)
        .with_context(|| format!("create download directory {}", root.display()))?;
    let store = Arc::new(LocalStore::new(root.clone(), cfg.fetch_options()));
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| cfg.terminal_timeout());
    let history = HistoryDb::open_default().await?;
    let orchestrator = Orchestrator::new(store)
        .with_timeout(timeout)
        .with_history(history);
    Ok((orchestrator, root))
}

#[cfg(test)]
mod tests;
