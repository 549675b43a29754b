use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{CreateUserRequest, UpdateUserRequest},
    is_valid_email, normalize_email,
    repo_types::{NewUser, User, UserPatch},
};
use crate::{
    error::ApiError,
    extract::{parse_id, ApiJson},
    repository::Entity,
    response::{created, done, ok, Reply},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn checked_email(raw: &str) -> Result<String, ApiError> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }
    Ok(email)
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<Reply<User>, ApiError> {
    let email = checked_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    let password_hash = state.hasher.hash(payload.password).await.map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal(e)
    })?;

    let user = state
        .users
        .create(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(created("User created successfully", user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Reply<Vec<User>>, ApiError> {
    let users = state.users.list().await?;
    Ok(ok(format!("{} retrieved successfully", User::PLURAL), users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<User>, ApiError> {
    let user = state.users.get_by_id(parse_id::<User>(&id)?).await?;
    Ok(ok("User retrieved successfully", user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Reply<User>, ApiError> {
    let id = parse_id::<User>(&id)?;
    let email = payload.email.as_deref().map(checked_email).transpose()?;
    let user = state
        .users
        .update(
            id,
            UserPatch {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email,
            },
        )
        .await?;
    info!(user_id = user.id, "user updated");
    Ok(ok("User updated successfully", user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<()>, ApiError> {
    let id = parse_id::<User>(&id)?;
    state.users.delete(id).await?;
    info!(user_id = id, "user deleted");
    Ok(done("User deleted successfully"))
}
