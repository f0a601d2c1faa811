use crate::error::Result;
use crate::paths;
use crate::timefmt::{format_duration, parse_duration};
use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Default time after which an in-progress attachment is considered stale.
pub fn default_stale_threshold() -> Duration {
    Duration::hours(1)
}

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

mod threshold_serde {
    use super::*;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_stale_threshold", with = "threshold_serde")]
    pub stale_threshold: Duration,
    #[serde(default = "default_store_marker")]
    pub store_marker: String,
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_store_marker() -> String {
    paths::DEFAULT_STORE_MARKER.to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    paths::DEFAULT_IGNORE_DIRS
        .iter()
        .map(|d| d.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            stale_threshold: default_stale_threshold(),
            store_marker: default_store_marker(),
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

impl Config {
    /// Load `<root>/.rigcheck/config.yaml`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.stale_threshold <= Duration::zero() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "stale_threshold '{}' must be > 0",
                    format_duration(self.stale_threshold)
                ),
            });
        }

        let marker = self.store_marker.trim();
        if marker.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "store_marker is empty".to_string(),
            });
        } else if marker.contains('/') || marker.contains('\\') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "store_marker '{}' must be a single directory name",
                    self.store_marker
                ),
            });
        }

        for dir in &self.ignore_dirs {
            if dir.starts_with('.') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "ignore_dirs entry '{dir}' is hidden and already skipped"
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
