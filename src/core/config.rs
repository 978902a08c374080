use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::telemetry::public_ip::DEFAULT_PUBLIC_IP_URL;

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "zh", "tr", "de", "fr", "es", "ja"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// User preferences, handed to the ui layer; the telemetry core never reads them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_public_ip_url")]
    pub public_ip_url: String,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_public_ip_url() -> String {
    DEFAULT_PUBLIC_IP_URL.to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: default_language(),
            theme: Theme::default(),
            public_ip_url: default_public_ip_url(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Preferences {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Missing, empty or corrupted files yield defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        if data.is_empty() {
            return Ok(Self::default());
        }

        let mut prefs: Preferences = serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {:?}: {}", path, e);
            Self::default()
        });
        prefs.normalize();
        Ok(prefs)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_vec_pretty(self).with_context(|| "Failed to serialize config")?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Unknown language codes fall back to English
    fn normalize(&mut self) {
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            self.language = default_language();
        }
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = default_tick_interval_ms();
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("vitalstat").join("config.json"))
    }
}
