use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::services_catalog::repository::{self, Model};
use crate::shared::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewService {
    pub name: Option<String>,
}

/// GET /services
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Model>>, ApiError> {
    Ok(Json(repository::list_all(&state.db).await?))
}

/// POST /services
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewService>,
) -> Result<(StatusCode, Json<Model>), ApiError> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Service name is required".into()))?;
    match repository::create(&state.db, name).await? {
        Some(model) => Ok((StatusCode::CREATED, Json(model))),
        None => Err(ApiError::Conflict(format!(
            "Service \"{name}\" already exists"
        ))),
    }
}
