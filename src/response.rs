use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Envelope shared by every endpoint, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Reply<T> {
    reply(StatusCode::OK, message, Some(data))
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Reply<T> {
    reply(StatusCode::CREATED, message, Some(data))
}

/// Success without a payload; `data` is serialized as `null`.
pub fn done(message: impl Into<String>) -> Reply<()> {
    reply(StatusCode::OK, message, None)
}

pub(crate) fn reply<T>(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Reply<T> {
    (
        status,
        Json(ApiResponse {
            success: status.is_success(),
            message: message.into(),
            data,
        }),
    )
}
