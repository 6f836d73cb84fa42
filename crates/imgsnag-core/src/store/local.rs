//! Local write service: fetch into a download root on this machine.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::data_url::decode_data_url;
use super::fetch::{fetch_to_file, FetchOptions};
use super::uniquify::unique_filename_among;
use super::{
    ConflictPolicy, StateRegistry, SubmitError, WriteId, WriteRequest, WriteService, WriteState,
};
use crate::reference::has_scheme;

/// Temporary file suffix used before the final rename.
const TEMP_SUFFIX: &str = ".part";

/// Writes locators under `root`, one blocking task per write.
///
/// State changes are kept in memory and published on the registry. Must be
/// used from inside a tokio runtime.
pub struct LocalStore {
    root: PathBuf,
    fetch: FetchOptions,
    next_id: AtomicU64,
    states: Arc<Mutex<HashMap<WriteId, WriteState>>>,
    registry: StateRegistry,
    /// Serializes name selection and rename so two writes never pick the same name.
    finalize_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, fetch: FetchOptions) -> Self {
        Self {
            root: root.into(),
            fetch,
            next_id: AtomicU64::new(1),
            states: Arc::new(Mutex::new(HashMap::new())),
            registry: StateRegistry::new(),
            finalize_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn set_state(
        states: &Mutex<HashMap<WriteId, WriteState>>,
        registry: &StateRegistry,
        id: WriteId,
        state: WriteState,
    ) {
        states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, state);
        registry.publish(id, state);
    }
}

/// Accepts relative `/`-separated paths whose segments are all plain names.
fn validate_relative_path(desired: &str) -> Result<PathBuf, SubmitError> {
    let plain = |seg: &str| !seg.is_empty() && seg != "." && seg != "..";
    if desired.contains('\\') || !desired.split('/').all(plain) {
        return Err(SubmitError::UnsafePath(desired.to_string()));
    }
    Ok(desired.split('/').collect())
}

enum Source {
    Data,
    Network,
}

fn classify_locator(locator: &str) -> Result<Source, SubmitError> {
    if has_scheme(locator, "data") {
        return Ok(Source::Data);
    }
    if has_scheme(locator, "http") || has_scheme(locator, "https") {
        return Ok(Source::Network);
    }
    let scheme = locator.split(':').next().unwrap_or_default().to_string();
    Err(SubmitError::UnsupportedScheme(scheme))
}

/// Everything a blocking write needs, owned.
struct WriteTask {
    id: WriteId,
    locator: String,
    source: Source,
    target: PathBuf,
    conflict: ConflictPolicy,
    fetch: FetchOptions,
    finalize_lock: Arc<Mutex<()>>,
}

impl WriteTask {
    /// Fetch into `<name>.<id>.part`, then rename to the final (uniquified) name.
    fn run(self) -> anyhow::Result<PathBuf> {
        use anyhow::Context;

        let dir = self
            .target
            .parent()
            .map(Path::to_path_buf)
            .context("target has no parent directory")?;
        let file_name = self
            .target
            .file_name()
            .and_then(|n| n.to_str())
            .context("target has no file name")?
            .to_string();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

        let temp_path = dir.join(format!("{}.{}{}", file_name, self.id, TEMP_SUFFIX));
        let result = self.write_temp(&temp_path);
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        let _guard = self.finalize_lock.lock().unwrap_or_else(|e| e.into_inner());
        let final_name = match self.conflict {
            ConflictPolicy::Overwrite => Some(file_name),
            ConflictPolicy::Uniquify => {
                unique_filename_among(&file_name, |candidate| dir.join(candidate).exists())
            }
        };
        let Some(final_name) = final_name else {
            let _ = fs::remove_file(&temp_path);
            anyhow::bail!("no free name for {}", self.target.display());
        };
        let final_path = dir.join(final_name);
        fs::rename(&temp_path, &final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(final_path)
    }

    fn write_temp(&self, temp_path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;
        use std::io::Write;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        match self.source {
            Source::Data => {
                let bytes = decode_data_url(&self.locator)?;
                file.write_all(&bytes)?;
            }
            Source::Network => {
                fetch_to_file(&self.locator, &mut file, &self.fetch)?;
            }
        }
        file.sync_all().context("storage sync failed")?;
        Ok(())
    }
}

#[async_trait]
impl WriteService for LocalStore {
    async fn submit(&self, request: WriteRequest) -> Result<WriteId, SubmitError> {
        if request.prompt {
            return Err(SubmitError::PromptUnsupported);
        }
        let source = classify_locator(&request.locator)?;
        let relative = validate_relative_path(&request.desired_path)?;
        let id = WriteId(self.next_id.fetch_add(1, Ordering::Relaxed));

        Self::set_state(&self.states, &self.registry, id, WriteState::InProgress);
        tracing::debug!(%id, path = %request.desired_path, "write accepted");

        let task = WriteTask {
            id,
            locator: request.locator,
            source,
            target: self.root.join(relative),
            conflict: request.conflict,
            fetch: self.fetch.clone(),
            finalize_lock: Arc::clone(&self.finalize_lock),
        };
        let states = Arc::clone(&self.states);
        let registry = self.registry.clone();
        tokio::task::spawn_blocking(move || {
            let state = match task.run() {
                Ok(path) => {
                    tracing::info!(%id, path = %path.display(), "write complete");
                    WriteState::Complete
                }
                Err(e) => {
                    tracing::warn!(%id, "write interrupted: {:#}", e);
                    WriteState::Interrupted
                }
            };
            Self::set_state(&states, &registry, id, state);
        });
        Ok(id)
    }

    async fn query_state(&self, id: WriteId) -> Option<WriteState> {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .copied()
    }

    fn registry(&self) -> &StateRegistry {
        &self.registry
    }
}
