use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::extract::{CollectOptions, MAX_STYLE_ELEMENTS, MIN_VISIBLE_AREA};
use crate::store::FetchOptions;

/// Global configuration loaded from `~/.config/imgsnag/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnagConfig {
    /// Download root; the current directory when unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// How long to wait for one write to finish before moving on.
    pub terminal_timeout_secs: u64,
    /// Also scan rendered elements for CSS background images.
    pub include_background_images: bool,
    /// Cap on elements scanned by the background-image pass.
    pub max_style_elements: usize,
    /// Elements with a smaller known area count as invisible.
    pub min_visible_area: f64,
    /// Optional HTTP settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub fetch: Option<FetchOptions>,
}

impl Default for SnagConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            terminal_timeout_secs: 60,
            include_background_images: false,
            max_style_elements: MAX_STYLE_ELEMENTS,
            min_visible_area: MIN_VISIBLE_AREA,
            fetch: None,
        }
    }
}

impl SnagConfig {
    pub fn terminal_timeout(&self) -> Duration {
        Duration::from_secs(self.terminal_timeout_secs)
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            include_background_images: self.include_background_images,
            max_style_elements: self.max_style_elements,
            min_visible_area: self.min_visible_area,
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        self.fetch.clone().unwrap_or_default()
    }

    /// Configured download root, or the current directory.
    pub fn download_root(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("resolve current directory"),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsnag")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SnagConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SnagConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SnagConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
