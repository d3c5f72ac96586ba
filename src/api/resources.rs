//! Generic entity endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{Acknowledgement, ApiJson};
use crate::auth::{Action, Caller};
use crate::errors::AppError;
use crate::models::{Entity, Record};
use crate::AppState;

/// GET /api/{path} - List all records.
pub async fn list<T: Entity>(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Record<T>>>, AppError> {
    caller.require(&state.config, T::RESOURCE, Action::View)?;

    let records = state
        .repository::<T>()
        .get_all()
        .await
        .map_err(|e| e.failed_to("fetch", &T::plural_noun()))?;

    Ok(Json(records))
}

/// GET /api/{path}/:id - Get a single record.
pub async fn fetch<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<Json<Record<T>>, AppError> {
    caller.require(&state.config, T::RESOURCE, Action::View)?;

    match state
        .repository::<T>()
        .get_by_id(&id)
        .await
        .map_err(|e| e.failed_to("fetch", &T::noun()))?
    {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::NotFound(format!("{} not found", T::LABEL))),
    }
}

/// POST /api/{path} - Create a new record.
pub async fn create<T: Entity>(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<ApiJson<T>, AppError>,
) -> Result<(StatusCode, Json<Record<T>>), AppError> {
    caller.require(&state.config, T::RESOURCE, Action::Create)?;
    let ApiJson(fields) = body?;
    fields.validate()?;

    let record = state
        .repository::<T>()
        .create(fields)
        .await
        .map_err(|e| e.failed_to("create", &T::noun()))?;

    tracing::info!(entity = T::RESOURCE.as_str(), id = %record.id, "Record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/{path}/:id - Replace a record.
pub async fn update<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
    body: Result<ApiJson<T>, AppError>,
) -> Result<Json<Record<T>>, AppError> {
    caller.require(&state.config, T::RESOURCE, Action::Edit)?;
    let ApiJson(fields) = body?;
    fields.validate()?;

    let record = state
        .repository::<T>()
        .update(&id, fields)
        .await
        .map_err(|e| e.failed_to("update", &T::noun()))?;

    tracing::info!(entity = T::RESOURCE.as_str(), %id, "Record updated");
    Ok(Json(record))
}

/// DELETE /api/{path}/:id - Delete a record. Deleting twice is not an error.
pub async fn remove<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<Json<Acknowledgement>, AppError> {
    caller.require(&state.config, T::RESOURCE, Action::Delete)?;

    let removed = state
        .repository::<T>()
        .delete(&id)
        .await
        .map_err(|e| e.failed_to("delete", &T::noun()))?;

    if removed {
        tracing::info!(entity = T::RESOURCE.as_str(), %id, "Record deleted");
    } else {
        tracing::debug!(entity = T::RESOURCE.as_str(), %id, "Delete of absent record");
    }
    Ok(Json(Acknowledgement::ok()))
}
