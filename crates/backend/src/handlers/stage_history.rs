use axum::extract::{Path, State};
use axum::Json;

use contracts::domain::stage_history::{ClientTimeline, StageHistoryEntry};

use crate::domain::{clients, stage_history};
use crate::shared::error::ApiError;
use crate::AppState;

/// GET /clients/:id/stage-history
pub async fn list(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<StageHistoryEntry>>, ApiError> {
    clients::repository::find_by_id(&state.db, &client_id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let entries = stage_history::service::list_history(&state.db, &client_id).await?;
    Ok(Json(entries))
}

/// GET /clients/:id/timeline
pub async fn timeline(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientTimeline>, ApiError> {
    let client = clients::repository::find_by_id(&state.db, &client_id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let timeline = stage_history::service::timeline(&state.db, &client).await?;
    Ok(Json(timeline))
}
