//! User administration endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{Acknowledgement, ApiJson};
use crate::auth::{require_pin, Action, Caller, Resource};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, User};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<User>>, AppError> {
    caller.require(&state.config, Resource::Users, Action::View)?;

    let users = state
        .users
        .list_users()
        .await
        .map_err(|e| e.failed_to("fetch", "users"))?;
    Ok(Json(users))
}

/// POST /api/users - Create a user with a PIN code.
pub async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<ApiJson<CreateUserRequest>, AppError>,
) -> Result<(StatusCode, Json<User>), AppError> {
    caller.require(&state.config, Resource::Users, Action::Create)?;
    let ApiJson(request) = body?;

    if request.name.trim().is_empty() {
        return Err(AppError::Validation("User name is required".to_string()));
    }
    let pin = require_pin(Some(request.pin_code.as_str()))?;
    if !(4..=8).contains(&pin.len()) || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "PIN code must be 4 to 8 digits".to_string(),
        ));
    }

    let user = state
        .users
        .create_user(
            request.name.trim(),
            request.role,
            pin,
            &state.config.pin_pepper,
        )
        .await
        .map_err(|e| e.failed_to("create", "user"))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /api/users/:id - Delete a user and their sessions.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<Json<Acknowledgement>, AppError> {
    caller.require(&state.config, Resource::Users, Action::Delete)?;

    if caller.user.as_ref().is_some_and(|u| u.id == id) {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    let removed = state
        .users
        .delete_user(&id)
        .await
        .map_err(|e| e.failed_to("delete", "user"))?;
    if removed {
        tracing::info!(user_id = %id, "User deleted");
    }
    Ok(Json(Acknowledgement::ok()))
}
