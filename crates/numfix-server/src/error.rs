use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use numfix_core::{ErrorDto, Rejection, SubmissionError};
use numfix_store::error::{StoreError, StoreErrorKind};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    MalformedInput(#[from] SubmissionError),
    #[error("invalid batch reference: {0}")]
    InvalidBatchRef(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) | ApiError::MalformedInput(_) | ApiError::InvalidBatchRef(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(err) => match err.kind() {
                StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
                StoreErrorKind::InvalidId => StatusCode::BAD_REQUEST,
                StoreErrorKind::Io
                | StoreErrorKind::Sql
                | StoreErrorKind::MissingHomeDir
                | StoreErrorKind::Migration
                | StoreErrorKind::InvalidDataPath => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };
        (status, Json(ErrorDto::new(message))).into_response()
    }
}
