use serde::{Deserialize, Serialize};

use crate::domain::client::Stage;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: Stage,
    pub count: u64,
}

/// Headline numbers for the dashboard, aggregated server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_clients: u64,
    /// Sum of deal values over non-terminal stages.
    pub pipeline_value: f64,
    pub won_clients: u64,
    pub lost_clients: u64,
    pub stage_counts: Vec<StageCount>,
}
