use std::path::Path;
use std::sync::Arc;
use taskgen_core::config::Config;
use taskgen_core::history::{History, HistoryStorage};
use taskgen_core::service::SpecService;
use tokio::sync::Mutex;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SpecService>,
    /// Held across a whole generate call so that concurrent requests do not
    /// lose each other's history entry.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(service: SpecService) -> Self {
        Self {
            service: Arc::new(service),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// State backed by the history file configured for `root`.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        let path = config.history_path(root);
        tracing::debug!(path = %path.display(), "opening history");
        Self::new(SpecService::new(History::open(path)))
    }

    pub fn with_storage(storage: impl HistoryStorage + 'static) -> Self {
        Self::new(SpecService::with_storage(storage))
    }
}
