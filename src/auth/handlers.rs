use axum::{extract::State, routing::post, Router};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::dto::{LoginRequest, TokenResponse},
    error::ApiError,
    extract::ApiJson,
    response::{ok, Reply},
    state::AppState,
    users::normalize_email,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Unknown email and wrong password are indistinguishable to the caller.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Reply<TokenResponse>, ApiError> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.users.find_by_key(&email).await? else {
        state.hasher.verify_dummy(payload.password).await;
        warn!(%email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    let valid = state
        .hasher
        .verify(payload.password, user.password_hash.clone())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "verify_password failed");
            ApiError::internal(e)
        })?;
    if !valid {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = state.jwt.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal(e)
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(ok("Login successful", TokenResponse { token }))
}
