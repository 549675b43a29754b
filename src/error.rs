//! Request-level failures and their envelope rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{repository::RepoError, response::reply};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid input. `detail` is echoed back in `data`.
    #[error("{message}")]
    BadRequest {
        message: String,
        detail: Option<String>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Backend failure; the cause is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict { .. } => Self::Conflict(err.to_string()),
            RepoError::NotFound(_) => Self::NotFound(err.to_string()),
            RepoError::MissingReference(_) => Self::bad_request(err.to_string()),
            RepoError::Storage(e) => Self::internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::BadRequest { message, detail } => reply(status, message, detail).into_response(),
            Self::Internal(cause) => {
                error!(error = %cause, "request failed");
                reply::<()>(status, "Internal server error", None).into_response()
            }
            other => reply::<()>(status, other.to_string(), None).into_response(),
        }
    }
}
