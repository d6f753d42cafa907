use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskgenError {
    #[error("{0}")]
    Validation(String),

    #[error("failed to write history to {}: {source}", .path.display())]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read history from {}: {message}", .path.display())]
    PersistenceRead { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TaskgenError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskgenError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, TaskgenError>;
