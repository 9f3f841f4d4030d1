use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const APP_DIR_NAME: &str = "FoldFind";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
const MIN_POLL_INTERVAL_MS: u64 = 10;

pub const ENV_ROOT: &str = "FOLDFIND_ROOT";
pub const ENV_CACHE: &str = "FOLDFIND_CACHE";
pub const ENV_POLL_MS: &str = "FOLDFIND_POLL_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder whose immediate subdirectories are searched.
    pub root_dir: PathBuf,
    pub cache_path: PathBuf,
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            cache_path: app_data_dir().join("cache.db"),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Reads `path` (missing file means defaults), then applies process env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::from_file(path)?;
        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_ROOT).filter(|v| !v.trim().is_empty()) {
            self.root_dir = PathBuf::from(root.trim());
        }
        if let Some(cache) = lookup(ENV_CACHE).filter(|v| !v.trim().is_empty()) {
            self.cache_path = PathBuf::from(cache.trim());
        }
        if let Some(raw) = lookup(ENV_POLL_MS) {
            self.poll_interval_ms =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_POLL_MS,
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

pub fn default_settings_path() -> PathBuf {
    app_data_dir().join("settings.json")
}

pub fn app_data_dir() -> PathBuf {
    data_dir_from(|key| env::var(key).ok())
}

fn data_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let base = if let Some(local) = lookup("LOCALAPPDATA") {
        PathBuf::from(local)
    } else if let Some(xdg) = lookup("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = lookup("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from(".")
    };
    base.join(APP_DIR_NAME)
}
