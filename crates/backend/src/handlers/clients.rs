use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use contracts::domain::client::{Client, ClientDraft};

use crate::domain::clients::service;
use crate::shared::error::ApiError;
use crate::AppState;

/// GET /clients
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(service::list_clients(&state.db).await?))
}

/// GET /clients/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Client>, ApiError> {
    Ok(Json(service::get_client(&state.db, &id).await?))
}

/// POST /clients
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<ClientDraft>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    let client = service::create_client(&state.db, &draft).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /clients/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ClientDraft>,
) -> Result<Json<Client>, ApiError> {
    Ok(Json(service::update_client(&state.db, &id, &draft).await?))
}

/// DELETE /clients/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service::delete_client(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
