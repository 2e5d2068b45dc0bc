use crate::icon::{IconSource, Platform};
use crate::paths;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_DEBOUNCE_MS: u64 = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    pub default_icon: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub debounce_ms: u64,
    pub platform: Option<Platform>,
    pub scale_factor: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Badge Shell".to_string(),
            default_icon: None,
            state_file: None,
            debounce_ms: 200,
            platform: None,
            scale_factor: 1.0,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = paths::settings_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => paths::state_path(),
        }
    }

    pub fn default_icon(&self) -> Result<IconSource> {
        match &self.default_icon {
            Some(path) => IconSource::from_path(path),
            None => Ok(IconSource::app_icon()),
        }
    }

    /// Quiet period after a state file change before it is re-read.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.max(MIN_DEBOUNCE_MS))
    }

    pub fn scale_factor(&self) -> f32 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }
}
