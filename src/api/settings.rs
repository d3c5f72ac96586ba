//! Settings API endpoints.

use axum::{extract::State, Json};

use super::ApiJson;
use crate::auth::{Action, Caller, Resource};
use crate::errors::AppError;
use crate::models::Settings;
use crate::AppState;

/// GET /api/settings - Current settings. Public: the UI needs them before login.
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    let settings = state
        .settings
        .get()
        .await
        .map_err(|e| e.failed_to("fetch", "settings"))?;
    Ok(Json(settings))
}

/// PUT /api/settings - Replace the settings.
pub async fn update_settings(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<ApiJson<Settings>, AppError>,
) -> Result<Json<Settings>, AppError> {
    caller.require(&state.config, Resource::Settings, Action::Edit)?;
    let ApiJson(settings) = body?;

    state
        .settings
        .update(&settings)
        .await
        .map_err(|e| e.failed_to("update", "settings"))?;

    tracing::info!(keys = settings.0.len(), "Settings updated");
    Ok(Json(settings))
}
