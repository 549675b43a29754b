use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::warn;

use crate::{
    error::ApiError,
    repository::{Entity, RepoError},
};

/// `Json<T>` whose rejections are rendered as the standard envelope.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "rejected request body");
                Err(ApiError::BadRequest {
                    message: "Cannot parse JSON".into(),
                    detail: Some(rejection.body_text()),
                })
            }
        }
    }
}

/// Parses a path segment as an id of `E`. A segment that is not an integer
/// can never match a row, so it is reported as a missing `E`.
pub fn parse_id<E: Entity>(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RepoError::NotFound(E::NAME).into())
}

/// Trims `raw` and rejects it when nothing is left.
pub fn non_blank(field: &str, raw: &str) -> Result<String, ApiError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} must not be empty")));
    }
    Ok(value.to_owned())
}
