//! Settings from `arcanum.yaml`, with environment overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::editor::EditorOptions;
use crate::error::TemplateResult;
use crate::font::DEFAULT_FONTS_URL;
use crate::preview::DeviceWidth;
use crate::splice::MissingMarkerPolicy;

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "arcanum.yaml";

pub const DATA_DIR_ENV: &str = "ARCANUM_DATA_DIR";
pub const FONTS_URL_ENV: &str = "ARCANUM_FONTS_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key-value store directory (snapshots, colors, gradients, prompt bundles)
    pub data_dir: PathBuf,
    /// Where the preview `index.html`/`frame.html` are written.
    /// Unset means `<data_dir>/preview`.
    pub preview_dir: Option<PathBuf>,
    /// Where exported templates and prompts are written
    pub export_dir: PathBuf,
    pub fonts_url: String,
    pub missing_marker: MissingMarkerPolicy,
    pub skip_duplicate_fragments: bool,
    pub device: DeviceWidth,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            preview_dir: None,
            export_dir: PathBuf::from("."),
            fonts_url: DEFAULT_FONTS_URL.to_string(),
            missing_marker: MissingMarkerPolicy::default(),
            skip_duplicate_fragments: false,
            device: DeviceWidth::Desktop,
        }
    }
}

/// `~/.arcanum`, or `./.arcanum` without a home directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".arcanum"))
        .unwrap_or_else(|| PathBuf::from(".arcanum"))
}

impl Config {
    /// Load from `path`, or from `arcanum.yaml` if it exists, else defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> TemplateResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> TemplateResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> TemplateResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(FONTS_URL_ENV).filter(|v| !v.is_empty()) {
            self.fonts_url = url;
        }
    }

    pub fn preview_dir(&self) -> PathBuf {
        self.preview_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("preview"))
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            missing_marker: self.missing_marker,
            skip_duplicate_fragments: self.skip_duplicate_fragments,
        }
    }
}
