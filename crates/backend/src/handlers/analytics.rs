use axum::extract::State;
use axum::Json;

use contracts::domain::analytics::DashboardSummary;
use contracts::domain::stage_history::{BackfillResult, StageAnalytics};

use crate::domain::{analytics, stage_history};
use crate::shared::error::ApiError;
use crate::AppState;

/// GET /analytics/stages
pub async fn stages(
    State(state): State<AppState>,
) -> Result<Json<Vec<StageAnalytics>>, ApiError> {
    Ok(Json(stage_history::service::stage_analytics(&state.db).await?))
}

/// GET /analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(analytics::dashboard_summary(&state.db).await?))
}

/// POST /analytics/backfill-stage-history
pub async fn backfill(State(state): State<AppState>) -> Result<Json<BackfillResult>, ApiError> {
    let count = stage_history::service::backfill(&state.db).await?;
    Ok(Json(BackfillResult {
        success: true,
        message: format!("Backfilled stage history for {count} clients"),
        count,
    }))
}
