//! Dashboard aggregates, folded from the client table in one pass.

use sea_orm::ConnectionTrait;

use contracts::domain::analytics::{DashboardSummary, StageCount};
use contracts::domain::client::Stage;

use crate::domain::clients;

pub async fn dashboard_summary<C: ConnectionTrait>(db: &C) -> anyhow::Result<DashboardSummary> {
    let clients = clients::repository::list_all(db).await?;

    let mut counts = [0u64; Stage::ALL.len()];
    let mut pipeline_value = 0.0;
    for client in &clients {
        let stage = Stage::parse(&client.stage).unwrap_or(Stage::Lead);
        counts[stage.position()] += 1;
        if !stage.is_terminal() {
            pipeline_value += client.value;
        }
    }

    let stage_counts = Stage::ALL
        .iter()
        .map(|stage| StageCount {
            stage: *stage,
            count: counts[stage.position()],
        })
        .collect();

    Ok(DashboardSummary {
        total_clients: clients.len() as u64,
        pipeline_value,
        won_clients: counts[Stage::Won.position()],
        lost_clients: counts[Stage::Lost.position()],
        stage_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clients::service::create_client;
    use crate::shared::data::db;
    use serde_json::json;

    #[tokio::test]
    async fn summary_excludes_terminal_stages_from_pipeline_value() {
        let conn = db::connect_in_memory().await.unwrap();
        db::init_schema(&conn).await.unwrap();

        let draft = |v: serde_json::Value| serde_json::from_value(v).unwrap();
        create_client(&conn, &draft(json!({"companyName": "A", "stage": "Lead", "value": 100})))
            .await
            .unwrap();
        create_client(
            &conn,
            &draft(json!({"companyName": "B", "stage": "Proposal Sent", "value": 250})),
        )
        .await
        .unwrap();
        create_client(&conn, &draft(json!({"companyName": "C", "stage": "Won", "value": 999})))
            .await
            .unwrap();

        let summary = dashboard_summary(&conn).await.unwrap();
        assert_eq!(summary.total_clients, 3);
        assert_eq!(summary.pipeline_value, 350.0);
        assert_eq!(summary.won_clients, 1);
        assert_eq!(summary.lost_clients, 0);

        let lead = summary
            .stage_counts
            .iter()
            .find(|c| c.stage == Stage::Lead)
            .unwrap();
        assert_eq!(lead.count, 1);
        assert_eq!(summary.stage_counts.len(), Stage::ALL.len());
    }
}
