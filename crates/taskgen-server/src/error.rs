use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taskgen_core::error::TaskgenError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<TaskgenError>() {
            Some(TaskgenError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(
                TaskgenError::PersistenceWrite { .. }
                | TaskgenError::PersistenceRead { .. }
                | TaskgenError::Io(_)
                | TaskgenError::Yaml(_)
                | TaskgenError::Json(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
