//! HTTP(S) GET into a local file (libcurl via the `curl` crate).

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::time::Duration;

/// Transfer limits for network locators (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchOptions {
    pub connect_timeout_secs: u64,
    /// Whole-transfer limit.
    pub timeout_secs: u64,
    pub max_redirections: u32,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 600,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("write: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads `url` with a single GET, writing the body to `out`.
/// Returns the number of bytes written.
///
/// Blocking; call from `spawn_blocking` when used from async code.
pub(super) fn fetch_to_file(url: &str, out: &mut File, opts: &FetchOptions) -> Result<u64, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(Duration::from_secs(opts.connect_timeout_secs))?;
    easy.timeout(Duration::from_secs(opts.timeout_secs))?;
    if let Some(agent) = &opts.user_agent {
        easy.useragent(agent)?;
    }

    let mut written = 0u64;
    let mut write_error: Option<std::io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match out.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("fetch write failed: {}", e);
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_error {
        return Err(FetchError::Io(e));
    }
    performed?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    out.flush()?;
    Ok(written)
}
