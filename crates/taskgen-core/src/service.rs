//! The Generate and History operations, independent of transport.

use crate::error::Result;
use crate::generator;
use crate::history::{History, HistoryStorage};
use crate::types::{HistoryRecord, ProjectRequest};
use chrono::Utc;

pub struct SpecService {
    history: History,
}

impl SpecService {
    pub fn new(history: History) -> Self {
        Self { history }
    }

    pub fn with_storage(storage: impl HistoryStorage + 'static) -> Self {
        Self::new(History::new(storage))
    }

    /// Validate `request`, expand it, and record the result. A validation
    /// failure returns before the generator or history is touched.
    pub fn generate(&self, request: ProjectRequest) -> Result<HistoryRecord> {
        request.validate()?;

        let spec = generator::generate(&request);
        let created_at = Utc::now();
        let id = self.history.next_id(created_at);
        let record = HistoryRecord::new(id, created_at, request, spec);

        self.history.record(record.clone())?;
        tracing::info!(
            id,
            template = %record.template,
            stories = record.stories.len(),
            tasks = record.tasks.len(),
            "generated spec"
        );
        Ok(record)
    }

    pub fn history(&self) -> Vec<HistoryRecord> {
        self.history.list()
    }
}
