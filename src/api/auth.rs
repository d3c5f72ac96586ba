//! Login, logout and session endpoints.

use axum::{extract::State, Json};

use super::{Acknowledgement, ApiJson};
use crate::auth::{capabilities, verify_pin_code, Caller};
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, SessionInfo};
use crate::AppState;

/// POST /api/auth/login - Exchange a PIN code for a session token.
pub async fn login(
    State(state): State<AppState>,
    body: Result<ApiJson<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    let ApiJson(request) = body?;

    let user = verify_pin_code(
        &state.users,
        &state.config.pin_pepper,
        request.pin_code.as_deref(),
    )
    .await
    .map_err(|e| e.failed_to("authenticate", "user"))?
    .ok_or_else(|| {
        tracing::info!("Login rejected: invalid PIN code");
        AppError::Unauthorized("Invalid PIN code".to_string())
    })?;

    if let Err(e) = state.users.purge_expired_sessions().await {
        tracing::warn!("Failed to purge expired sessions: {}", e);
    }

    let session = state
        .users
        .create_session(&user.id, state.config.session_ttl_secs)
        .await
        .map_err(|e| e.failed_to("create", "session"))?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    Ok(Json(LoginResponse {
        user,
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// POST /api/auth/logout - Revoke the presented session, if any.
pub async fn logout(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Acknowledgement>, AppError> {
    if let Some(session) = &caller.session {
        state
            .users
            .revoke_session(&session.token)
            .await
            .map_err(|e| e.failed_to("revoke", "session"))?;
        tracing::info!(user_id = %session.user_id, "User logged out");
    }
    Ok(Json(Acknowledgement::ok()))
}

/// GET /api/auth/session - The signed-in user and their capability map.
pub async fn current_session(caller: Caller) -> Result<Json<SessionInfo>, AppError> {
    let (user, session) = caller.signed_in()?;

    Ok(Json(SessionInfo {
        user: user.clone(),
        expires_at: session.expires_at.to_rfc3339(),
        permissions: capabilities(user.role),
    }))
}
