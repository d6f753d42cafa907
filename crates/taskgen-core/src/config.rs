use crate::error::{Result, TaskgenError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "https://samarsingh05.github.io".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// History file, relative to the project root unless absolute.
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

fn default_history_path() -> PathBuf {
    PathBuf::from(paths::HISTORY_FILE)
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Contents of `taskgen.yaml`. Every field is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load `taskgen.yaml` under `root`, falling back to defaults when the
    /// file is absent, then apply `PORT` and `TASKGEN_HISTORY_PATH`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let mut config = match crate::io::read_if_exists(&path)? {
            Some(data) if !data.trim().is_empty() => serde_yaml::from_str(&data)?,
            _ => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    /// Overlay environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.server.port = port.trim().parse().map_err(|_| {
                TaskgenError::Validation(format!("PORT must be a port number, got '{port}'"))
            })?;
        }
        if let Some(path) = lookup("TASKGEN_HISTORY_PATH").filter(|p| !p.trim().is_empty()) {
            self.history.path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Absolute location of the history file for a project at `root`.
    pub fn history_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.history.path)
    }
}
