//! Stage history engine: keeps the append-only interval log in sync with
//! client writes and derives analytics and timelines from it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;

use contracts::domain::client::Stage;
use contracts::domain::stage_history::{
    ClientTimeline, StageAnalytics, StageHistoryEntry, TimelineStage,
};
use contracts::domain::timeline::{classify, elapsed_days, HistoryInterval};
use contracts::reference::expected_duration;

use super::repository;
use crate::domain::clients;

fn to_entry(m: repository::Model) -> StageHistoryEntry {
    StageHistoryEntry {
        id: m.id,
        client_id: m.client_id,
        stage: Stage::parse(&m.stage).unwrap_or(Stage::Lead),
        entered_at: m.entered_at,
        exited_at: m.exited_at,
        duration_seconds: m.duration_seconds,
    }
}

/// First persistence of a client opens its initial interval.
pub async fn record_create<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
    stage: Stage,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    repository::insert_open(db, client_id, stage.as_str(), now).await?;
    Ok(())
}

/// Close the open interval and open one for the new stage. Callers invoke
/// this only when the stage actually changed, inside the same transaction as
/// the client update so the close/open pair lands atomically.
pub async fn record_transition<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
    new_stage: Stage,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    match repository::find_open(db, client_id).await? {
        Some(open) => {
            let duration = ((now - open.entered_at).num_milliseconds() / 1000).max(0);
            repository::close(db, &open, now, duration).await?;
        }
        None => {
            // Data-integrity gap, recoverable: the client update proceeds.
            tracing::warn!(client_id, "no open stage interval to close");
        }
    }
    repository::insert_open(db, client_id, new_stage.as_str(), now).await?;
    Ok(())
}

/// History for one client, newest first.
pub async fn list_history<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
) -> anyhow::Result<Vec<StageHistoryEntry>> {
    let entries = repository::list_for_client(db, client_id, true).await?;
    Ok(entries.into_iter().map(to_entry).collect())
}

/// Insert an initial interval for every client lacking history, dated at the
/// client's creation. Idempotent: covered clients are skipped.
pub async fn backfill<C: ConnectionTrait>(db: &C) -> anyhow::Result<u64> {
    let clients = clients::repository::list_all(db).await?;
    let covered: HashSet<String> = repository::client_ids_with_history(db)
        .await?
        .into_iter()
        .collect();
    let mut count = 0;
    for client in clients {
        if covered.contains(&client.id) {
            continue;
        }
        repository::insert_open(db, &client.id, &client.stage, client.created_at).await?;
        count += 1;
    }
    if count > 0 {
        tracing::info!(count, "backfilled stage history");
    }
    Ok(count)
}

/// Per-stage aggregates over the whole log. Averages cover closed entries
/// only; stages nobody ever occupied are omitted.
pub async fn stage_analytics<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<StageAnalytics>> {
    #[derive(Default)]
    struct Acc {
        duration_sum: i64,
        closed: u64,
        clients: HashSet<String>,
    }

    let mut by_stage: HashMap<Stage, Acc> = HashMap::new();
    for entry in repository::list_all(db).await? {
        let stage = Stage::parse(&entry.stage).unwrap_or(Stage::Lead);
        let acc = by_stage.entry(stage).or_default();
        acc.clients.insert(entry.client_id.clone());
        if let Some(exited) = entry.exited_at {
            acc.closed += 1;
            acc.duration_sum += entry
                .duration_seconds
                .filter(|secs| *secs > 0)
                .unwrap_or_else(|| (exited - entry.entered_at).num_seconds().max(0));
        }
    }

    let mut rows = Vec::with_capacity(by_stage.len());
    for stage in Stage::ALL {
        if let Some(acc) = by_stage.remove(&stage) {
            let average = if acc.closed > 0 {
                acc.duration_sum as f64 / acc.closed as f64
            } else {
                0.0
            };
            rows.push(StageAnalytics {
                stage,
                average_duration_seconds: average,
                total_clients: acc.clients.len() as u64,
                completed_clients: acc.closed,
            });
        }
    }
    Ok(rows)
}

/// Ordered, classified view of one client's journey through the pipeline.
pub async fn timeline<C: ConnectionTrait>(
    db: &C,
    client: &clients::repository::Model,
) -> anyhow::Result<ClientTimeline> {
    let now = Utc::now();
    let entries = repository::list_for_client(db, &client.id, false).await?;

    let mut stages = Vec::with_capacity(entries.len());
    for entry in &entries {
        let stage = Stage::parse(&entry.stage).unwrap_or(Stage::Lead);
        let interval = HistoryInterval {
            entered_at: entry.entered_at,
            exited_at: entry.exited_at,
            duration_seconds: entry.duration_seconds,
        };
        let duration_days = elapsed_days(&interval, now);
        let band = expected_duration(stage);
        stages.push(TimelineStage {
            stage,
            entered_at: entry.entered_at,
            exited_at: entry.exited_at,
            duration_days,
            expected_min_days: band.min_days,
            expected_max_days: band.max_days,
            status: classify(stage, duration_days),
            is_current: entry.exited_at.is_none(),
        });
    }

    let total_duration_days = match entries.first() {
        Some(first) => {
            let end = if entries.iter().any(|e| e.exited_at.is_none()) {
                now
            } else {
                entries.iter().filter_map(|e| e.exited_at).max().unwrap_or(now)
            };
            (end - first.entered_at).num_days().max(0)
        }
        None => 0,
    };

    Ok(ClientTimeline {
        client_id: client.id.clone(),
        company_name: client.company_name.clone(),
        stages,
        total_duration_days,
        current_stage: Stage::parse(&client.stage).unwrap_or(Stage::Lead),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use chrono::Duration;
    use sea_orm::DatabaseConnection;

    async fn setup() -> DatabaseConnection {
        let conn = db::connect_in_memory().await.unwrap();
        db::init_schema(&conn).await.unwrap();
        conn
    }

    async fn seed_client(conn: &DatabaseConnection, id: &str, stage: Stage) {
        let now = Utc::now();
        let model = clients::repository::Model {
            id: id.to_string(),
            company_name: format!("Client {id}"),
            contact_person: None,
            email: None,
            phone: None,
            stage: stage.as_str().to_string(),
            status: None,
            value: 0.0,
            priority: "Medium".to_string(),
            country: None,
            responsible_person_id: None,
            service_id: None,
            notes: None,
            linkedin: None,
            source: None,
            industry: None,
            estimated_close_date: None,
            win_probability: None,
            last_follow_up: None,
            next_follow_up: None,
            pipeline_start_date: None,
            created_at: now - Duration::days(3),
            updated_at: now,
        };
        clients::repository::insert(conn, &model).await.unwrap();
    }

    #[tokio::test]
    async fn transition_closes_open_interval_and_opens_new_one() {
        let conn = setup().await;
        seed_client(&conn, "c1", Stage::Lead).await;

        let entered = Utc::now() - Duration::seconds(90);
        record_create(&conn, "c1", Stage::Lead, entered).await.unwrap();

        let now = Utc::now();
        record_transition(&conn, "c1", Stage::Qualified, now)
            .await
            .unwrap();

        let entries = repository::list_for_client(&conn, "c1", false).await.unwrap();
        assert_eq!(entries.len(), 2);

        let closed = &entries[0];
        assert_eq!(closed.stage, "Lead");
        assert_eq!(closed.exited_at, Some(now));
        let secs = closed.duration_seconds.unwrap();
        assert!((89..=91).contains(&secs), "duration was {secs}");

        let open = &entries[1];
        assert_eq!(open.stage, "Qualified");
        assert!(open.exited_at.is_none());
        assert!(open.duration_seconds.is_none());
    }

    #[tokio::test]
    async fn at_most_one_open_interval_per_client() {
        let conn = setup().await;
        seed_client(&conn, "c1", Stage::Lead).await;

        record_create(&conn, "c1", Stage::Lead, Utc::now()).await.unwrap();
        record_transition(&conn, "c1", Stage::Qualified, Utc::now())
            .await
            .unwrap();
        record_transition(&conn, "c1", Stage::ProposalSent, Utc::now())
            .await
            .unwrap();

        let open = repository::list_open(&conn).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].stage, "Proposal Sent");
    }

    #[tokio::test]
    async fn missing_open_interval_is_recovered_not_fatal() {
        let conn = setup().await;
        seed_client(&conn, "c1", Stage::Lead).await;

        // No record_create: the log has a gap.
        record_transition(&conn, "c1", Stage::Qualified, Utc::now())
            .await
            .unwrap();

        let entries = repository::list_for_client(&conn, "c1", false).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].exited_at.is_none());
    }

    #[tokio::test]
    async fn backfill_is_idempotent() {
        let conn = setup().await;
        seed_client(&conn, "c1", Stage::Qualified).await;
        seed_client(&conn, "c2", Stage::Lead).await;
        record_create(&conn, "c2", Stage::Lead, Utc::now()).await.unwrap();

        assert_eq!(backfill(&conn).await.unwrap(), 1);
        assert_eq!(backfill(&conn).await.unwrap(), 0);

        // Backfilled entry uses the client's creation timestamp.
        let entries = repository::list_for_client(&conn, "c1", false).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stage, "Qualified");
        assert!(entries[0].exited_at.is_none());
    }

    #[tokio::test]
    async fn analytics_aggregates_closed_entries_only() {
        let conn = setup().await;
        seed_client(&conn, "c1", Stage::Qualified).await;
        seed_client(&conn, "c2", Stage::Lead).await;

        let now = Utc::now();
        // c1 spent 100s in Lead, now in Qualified; c2 still in Lead.
        let lead = repository::insert_open(&conn, "c1", "Lead", now - Duration::seconds(300))
            .await
            .unwrap();
        repository::close(&conn, &lead, now - Duration::seconds(200), 100)
            .await
            .unwrap();
        repository::insert_open(&conn, "c1", "Qualified", now - Duration::seconds(200))
            .await
            .unwrap();
        repository::insert_open(&conn, "c2", "Lead", now).await.unwrap();

        let rows = stage_analytics(&conn).await.unwrap();
        let lead_row = rows.iter().find(|r| r.stage == Stage::Lead).unwrap();
        assert_eq!(lead_row.total_clients, 2);
        assert_eq!(lead_row.completed_clients, 1);
        assert!((lead_row.average_duration_seconds - 100.0).abs() < f64::EPSILON);

        let qualified = rows.iter().find(|r| r.stage == Stage::Qualified).unwrap();
        assert_eq!(qualified.completed_clients, 0);
        assert_eq!(qualified.average_duration_seconds, 0.0);
    }

    #[tokio::test]
    async fn timeline_classifies_and_totals() {
        let conn = setup().await;
        seed_client(&conn, "c1", Stage::Qualified).await;

        let now = Utc::now();
        let lead = repository::insert_open(&conn, "c1", "Lead", now - Duration::days(20))
            .await
            .unwrap();
        repository::close(
            &conn,
            &lead,
            now - Duration::days(16),
            4 * 86_400,
        )
        .await
        .unwrap();
        repository::insert_open(&conn, "c1", "Qualified", now - Duration::days(16))
            .await
            .unwrap();

        let client = clients::repository::find_by_id(&conn, "c1")
            .await
            .unwrap()
            .unwrap();
        let timeline = timeline(&conn, &client).await.unwrap();

        assert_eq!(timeline.current_stage, Stage::Qualified);
        assert_eq!(timeline.stages.len(), 2);
        assert_eq!(timeline.total_duration_days, 20);

        let lead_stage = &timeline.stages[0];
        assert_eq!(lead_stage.duration_days, 4);
        assert!(!lead_stage.is_current);

        // 16 days in Qualified against a max of 14 puts it in the warning
        // band (14 * 1.5 = 21).
        let current = &timeline.stages[1];
        assert!(current.is_current);
        assert_eq!(
            current.status,
            contracts::domain::timeline::TimelineStatus::Warning
        );
    }
}
