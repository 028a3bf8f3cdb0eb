use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::Stage;
use crate::domain::timeline::TimelineStatus;

/// One logged interval during which a client occupied a stage. At most one
/// entry per client is open (`exitedAt` null) at any quiescent point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageHistoryEntry {
    pub id: String,
    pub client_id: String,
    pub stage: Stage,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

/// Per-stage aggregate over all history entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAnalytics {
    pub stage: Stage,
    /// Average over closed entries only; 0 when no entry has closed yet.
    pub average_duration_seconds: f64,
    /// Distinct clients that ever occupied the stage.
    pub total_clients: u64,
    /// Entries that have exited the stage.
    pub completed_clients: u64,
}

/// One stage of a client's timeline, annotated with its classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStage {
    pub stage: Stage,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub duration_days: i64,
    pub expected_min_days: i64,
    pub expected_max_days: i64,
    pub status: TimelineStatus,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTimeline {
    pub client_id: String,
    pub company_name: String,
    pub stages: Vec<TimelineStage>,
    pub total_duration_days: i64,
    pub current_stage: Stage,
}

/// Response of the history backfill maintenance operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillResult {
    pub success: bool,
    pub message: String,
    pub count: u64,
}
