use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures while draining a cursor into a `RecordSet`
#[derive(Debug, Error)]
pub enum MaterializationError {
    #[error("column metadata unavailable")]
    SchemaUnavailable(#[source] sqlx::Error),

    /// `row` is zero-based
    #[error("failed to decode row {row}")]
    RowDecodeFailed {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("cursor failed during iteration")]
    CursorFault(#[source] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("query execution failed")]
    QueryExecutionFailed(#[from] sqlx::Error),

    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    #[error("failed to encode response")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Renders an error and its source chain on one line for logging
pub fn report(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
