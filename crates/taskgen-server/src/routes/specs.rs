use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use taskgen_core::error::TaskgenError;
use taskgen_core::types::{HistoryRecord, ProjectRequest};

use crate::error::AppError;
use crate::state::AppState;

/// Wire shape of a generate request. Every field is optional here so that
/// missing required fields produce our own 400 rather than an extractor
/// rejection.
#[derive(Debug, Default, serde::Deserialize)]
pub struct GenerateBody {
    pub goal: Option<String>,
    pub users: Option<String>,
    pub template: Option<String>,
    pub constraints: Option<String>,
    pub risks: Option<String>,
}

impl From<GenerateBody> for ProjectRequest {
    fn from(body: GenerateBody) -> Self {
        ProjectRequest::from_parts(
            body.goal,
            body.users,
            body.template,
            body.constraints,
            body.risks,
        )
    }
}

/// A request without a JSON content type is read as an empty body, so it
/// fails required-field validation. Unparseable JSON is a 400 as well.
fn body_or_reject(
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<GenerateBody, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(GenerateBody::default()),
        Err(rejection) => Err(TaskgenError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))
        .into()),
    }
}

/// POST /api/specs/generate — expand a project description and record it.
pub async fn generate(
    State(app): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<HistoryRecord>, AppError> {
    let request = ProjectRequest::from(body_or_reject(payload)?);
    request.validate()?;

    // Owned guard moves into the blocking task, so the lock outlives a
    // dropped request future.
    let guard = app.write_lock.clone().lock_owned().await;
    let service = app.service.clone();
    let record = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        service.generate(request)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(record))
}

/// GET /api/specs/history — up to five most recent records, newest first.
pub async fn history(State(app): State<AppState>) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let service = app.service.clone();
    let records = tokio::task::spawn_blocking(move || service.history())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(records))
}
