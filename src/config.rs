use crate::color::ColorMode;
use crate::error::{Result, ReviewError};
use crate::waveform::WaveformLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_DIR: &str = "broadcast-review";
const CONFIG_FILE: &str = "config.json";

/// Settings injected into the review session at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Base URL of the review API, without trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default)]
    pub layout: WaveformLayout,
}

fn default_api_base() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig {
            api_base: default_api_base(),
            color_mode: ColorMode::default(),
            layout: WaveformLayout::default(),
        }
    }
}

impl ReviewConfig {
    /// `<config dir>/broadcast-review/config.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(config) => return config,
                    Err(e) => warn!(path = %path.display(), error = %e, "corrupt config file, using defaults"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "could not read config file"),
            }
        }
        ReviewConfig::default()
    }

    /// Load from [`ReviewConfig::default_path`], or defaults.
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => ReviewConfig::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Replace the API base, rejecting values that are not http(s) URLs.
    pub fn set_api_base(&mut self, api_base: &str) -> Result<()> {
        let trimmed = api_base.trim().trim_end_matches('/');
        let url = reqwest::Url::parse(trimmed)
            .map_err(|e| ReviewError::Config(format!("Invalid API base '{}': {}", api_base, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ReviewError::Config(format!(
                "API base must be http or https, got '{}'",
                url.scheme()
            )));
        }
        self.api_base = trimmed.to_string();
        Ok(())
    }
}
