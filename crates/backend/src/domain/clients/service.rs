//! Client orchestration: normalization, persistence, stage transitions and
//! assembly of the denormalized API shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use contracts::domain::client::{Activity, Client, ClientDraft, Priority, Stage};
use contracts::domain::timeline::{classify, elapsed_days, HistoryInterval, TimelineStatus};
use contracts::domain::validate::{normalize, ClientCandidate};
use contracts::reference::currency_for_country;

use super::repository;
use crate::domain::{activities, services_catalog, stage_history, users};
use crate::shared::error::ApiError;

pub async fn list_clients(db: &DatabaseConnection) -> Result<Vec<Client>, ApiError> {
    let models = repository::list_all(db).await?;
    enrich(db, models).await.map_err(ApiError::from)
}

pub async fn get_client(db: &DatabaseConnection, id: &str) -> Result<Client, ApiError> {
    let model = repository::find_by_id(db, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let mut clients = enrich(db, vec![model]).await?;
    clients.pop().ok_or(ApiError::NotFound("client"))
}

pub async fn create_client(
    db: &DatabaseConnection,
    draft: &ClientDraft,
) -> Result<Client, ApiError> {
    let now = Utc::now();
    let outcome = normalize(draft, now);
    if !outcome.errors.is_empty() {
        return Err(ApiError::Validation(outcome.errors));
    }
    for warning in &outcome.warnings {
        tracing::warn!(field = warning.field, "{}", warning.message);
    }
    let model = create_from_candidate(db, &outcome.candidate, now).await?;
    get_client(db, &model.id).await
}

/// Persist an already-normalized candidate. The row insert, the initial stage
/// interval and the creation log line land in one transaction. Shared with
/// the spreadsheet import loop.
pub async fn create_from_candidate(
    db: &DatabaseConnection,
    candidate: &ClientCandidate,
    now: DateTime<Utc>,
) -> anyhow::Result<repository::Model> {
    let txn = db.begin().await?;

    let responsible_person_id = match &candidate.responsible_person {
        Some(name) => Some(users::repository::get_or_create(&txn, name).await?.id),
        None => None,
    };
    let service_id = services_catalog::repository::get_or_create(&txn, &candidate.service)
        .await?
        .id;

    let model = repository::Model {
        id: Uuid::new_v4().to_string(),
        company_name: candidate.company_name.clone(),
        contact_person: candidate.contact_person.clone(),
        email: candidate.email.clone(),
        phone: candidate.phone.clone(),
        stage: candidate.stage.as_str().to_string(),
        status: candidate.status.map(|s| s.as_str().to_string()),
        value: candidate.value,
        priority: candidate.priority.as_str().to_string(),
        country: candidate.country.clone(),
        responsible_person_id: responsible_person_id.clone(),
        service_id: Some(service_id),
        notes: candidate.notes.clone(),
        linkedin: candidate.linkedin.clone(),
        source: candidate.source.map(|s| s.as_str().to_string()),
        industry: candidate.industry.clone(),
        estimated_close_date: candidate.estimated_close_date,
        win_probability: candidate.win_probability,
        last_follow_up: Some(candidate.last_follow_up),
        next_follow_up: Some(candidate.next_follow_up),
        pipeline_start_date: Some(now),
        created_at: now,
        updated_at: now,
    };
    repository::insert(&txn, &model).await?;
    stage_history::service::record_create(&txn, &model.id, candidate.stage, now).await?;
    activities::repository::insert(&txn, &model.id, "Client created", responsible_person_id)
        .await?;

    txn.commit().await?;
    Ok(model)
}

pub async fn update_client(
    db: &DatabaseConnection,
    id: &str,
    draft: &ClientDraft,
) -> Result<Client, ApiError> {
    let existing = repository::find_by_id(db, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;

    let now = Utc::now();
    let outcome = normalize(draft, now);
    if !outcome.errors.is_empty() {
        return Err(ApiError::Validation(outcome.errors));
    }
    for warning in &outcome.warnings {
        tracing::warn!(field = warning.field, "{}", warning.message);
    }
    let candidate = &outcome.candidate;

    let old_stage = Stage::parse(&existing.stage).unwrap_or(Stage::Lead);
    let stage_changed = old_stage != candidate.stage;

    let txn = db.begin().await?;

    let responsible_person_id = match &candidate.responsible_person {
        Some(name) => Some(users::repository::get_or_create(&txn, name).await?.id),
        None => None,
    };
    let service_id = services_catalog::repository::get_or_create(&txn, &candidate.service)
        .await?
        .id;

    let model = repository::Model {
        id: existing.id.clone(),
        company_name: candidate.company_name.clone(),
        contact_person: candidate.contact_person.clone(),
        email: candidate.email.clone(),
        phone: candidate.phone.clone(),
        stage: candidate.stage.as_str().to_string(),
        status: candidate.status.map(|s| s.as_str().to_string()),
        value: candidate.value,
        priority: candidate.priority.as_str().to_string(),
        country: candidate.country.clone(),
        responsible_person_id: responsible_person_id.clone(),
        service_id: Some(service_id),
        notes: candidate.notes.clone(),
        linkedin: candidate.linkedin.clone(),
        source: candidate.source.map(|s| s.as_str().to_string()),
        industry: candidate.industry.clone(),
        estimated_close_date: candidate.estimated_close_date,
        win_probability: candidate.win_probability,
        last_follow_up: Some(candidate.last_follow_up),
        next_follow_up: Some(candidate.next_follow_up),
        pipeline_start_date: existing.pipeline_start_date,
        created_at: existing.created_at,
        updated_at: now,
    };
    repository::update(&txn, &model).await?;

    if stage_changed {
        stage_history::service::record_transition(&txn, id, candidate.stage, now).await?;
        let action = format!("Stage changed from {old_stage} to {}", candidate.stage);
        activities::repository::insert(&txn, id, &action, responsible_person_id).await?;
    }

    txn.commit().await?;
    get_client(db, id).await
}

pub async fn delete_client(db: &DatabaseConnection, id: &str) -> Result<(), ApiError> {
    if repository::delete(db, id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("client"))
    }
}

pub async fn add_activity(
    db: &DatabaseConnection,
    client_id: &str,
    action: &str,
    user_name: Option<&str>,
) -> Result<Activity, ApiError> {
    let action = action.trim();
    if action.is_empty() {
        return Err(ApiError::BadRequest("Activity action is required".into()));
    }
    repository::find_by_id(db, client_id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;

    let user = match user_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Some(users::repository::get_or_create(db, name).await?),
        None => None,
    };
    let model = activities::repository::insert(
        db,
        client_id,
        action,
        user.as_ref().map(|u| u.id.clone()),
    )
    .await?;
    Ok(Activity {
        id: model.id,
        action: model.action,
        user_name: user.map(|u| u.name),
        created_at: model.created_at,
    })
}

pub async fn delete_activity(
    db: &DatabaseConnection,
    client_id: &str,
    activity_id: &str,
) -> Result<(), ApiError> {
    if activities::repository::delete(db, client_id, activity_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("activity"))
    }
}

/// Resolve foreign keys to names, inline the activity log and classify the
/// current stage occupancy. Batch queries so list views stay O(1) in queries.
async fn enrich(
    db: &DatabaseConnection,
    models: Vec<repository::Model>,
) -> anyhow::Result<Vec<Client>> {
    let user_names: HashMap<String, String> = users::repository::list_all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();
    let service_names: HashMap<String, String> = services_catalog::repository::list_all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let mut activity_log: HashMap<String, Vec<Activity>> = HashMap::new();
    for entry in activities::repository::list_all(db).await? {
        let user_name = entry
            .user_id
            .as_ref()
            .and_then(|id| user_names.get(id))
            .cloned();
        activity_log.entry(entry.client_id.clone()).or_default().push(Activity {
            id: entry.id,
            action: entry.action,
            user_name,
            created_at: entry.created_at,
        });
    }

    let now = Utc::now();
    let mut open_status: HashMap<String, TimelineStatus> = HashMap::new();
    for entry in stage_history::repository::list_open(db).await? {
        let stage = Stage::parse(&entry.stage).unwrap_or(Stage::Lead);
        let interval = HistoryInterval {
            entered_at: entry.entered_at,
            exited_at: None,
            duration_seconds: None,
        };
        open_status.insert(entry.client_id, classify(stage, elapsed_days(&interval, now)));
    }

    let clients = models
        .into_iter()
        .map(|m| {
            let activities = activity_log.remove(&m.id).unwrap_or_default();
            let timeline_status = open_status.get(&m.id).copied();
            to_client(m, &user_names, &service_names, activities, timeline_status)
        })
        .collect();
    Ok(clients)
}

fn to_client(
    m: repository::Model,
    user_names: &HashMap<String, String>,
    service_names: &HashMap<String, String>,
    activities: Vec<Activity>,
    timeline_status: Option<TimelineStatus>,
) -> Client {
    let currency = m
        .country
        .as_deref()
        .and_then(currency_for_country)
        .map(str::to_string);
    Client {
        id: m.id,
        company_name: m.company_name,
        contact_person: m.contact_person,
        email: m.email,
        phone: m.phone,
        stage: Stage::parse(&m.stage).unwrap_or(Stage::Lead),
        status: m.status.as_deref().and_then(contracts::domain::client::ClientStatus::parse),
        value: m.value,
        priority: Priority::parse(&m.priority).unwrap_or(Priority::Medium),
        country: m.country,
        currency,
        responsible_person: m
            .responsible_person_id
            .as_ref()
            .and_then(|id| user_names.get(id))
            .cloned(),
        service: m
            .service_id
            .as_ref()
            .and_then(|id| service_names.get(id))
            .cloned(),
        notes: m.notes,
        linkedin: m.linkedin,
        source: m.source.as_deref().and_then(contracts::domain::client::LeadSource::parse),
        industry: m.industry,
        estimated_close_date: m.estimated_close_date,
        win_probability: m.win_probability,
        last_follow_up: m.last_follow_up,
        next_follow_up: m.next_follow_up,
        pipeline_start_date: m.pipeline_start_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
        activities,
        timeline_status,
    }
}
