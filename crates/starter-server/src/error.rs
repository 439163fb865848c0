//! Mapping of project errors onto HTTP responses

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use starter_core::ProjectError;
use thiserror::Error;

/// Message returned for every server-side failure; details only go to the log
const GENERIC_FAILURE: &str = "Error during project creation";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("malformed query string: {}", .0.body_text())]
    Query(#[from] QueryRejection),

    #[error("malformed request body: {}", .0.body_text())]
    Json(#[from] JsonRejection),

    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Project(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Json(JsonRejection::MissingJsonContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::Query(_) | ApiError::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Project(ProjectError::InvalidField { .. }) => "INVALID_FIELD",
            ApiError::Project(ProjectError::UnknownShortId(_)) => "UNKNOWN_SHORT_ID",
            ApiError::Project(ProjectError::UnknownExtension(_)) => "UNKNOWN_EXTENSION",
            ApiError::Project(ProjectError::Generation(_)) => "GENERATION_FAILED",
            ApiError::Query(_) | ApiError::Json(_) => "MALFORMED_REQUEST",
            ApiError::Project(_) | ApiError::Task(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_client_error() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "project request failed");
            GENERIC_FAILURE.to_string()
        };

        let body = ErrorResponse {
            code: self.code().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
