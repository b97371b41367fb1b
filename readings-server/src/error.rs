use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use readings_common::LookupError;
use serde_json::json;
use thiserror::Error;

use crate::source::SourceError;

/// Every failure a request can end in. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error(transparent)]
    InvalidDate(#[from] LookupError),

    #[error("{}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidDate(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
