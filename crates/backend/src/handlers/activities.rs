use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use contracts::domain::client::Activity;

use crate::domain::clients::service;
use crate::shared::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub action: Option<String>,
    pub user_name: Option<String>,
}

/// POST /clients/:id/activities
pub async fn create(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(body): Json<NewActivity>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let activity = service::add_activity(
        &state.db,
        &client_id,
        body.action.as_deref().unwrap_or(""),
        body.user_name.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// DELETE /clients/:id/activities/:activity_id
pub async fn delete(
    State(state): State<AppState>,
    Path((client_id, activity_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    service::delete_activity(&state.db, &client_id, &activity_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
