//! Append-only log of stage occupancy intervals. Closed entries are
//! immutable; the only mutation ever applied is closing the open interval.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect, Set, Unchanged};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "client_stage_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_id: String,
    pub stage: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::clients::repository::Entity",
        from = "Column::ClientId",
        to = "crate::domain::clients::repository::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl ActiveModelBehavior for ActiveModel {}

/// Open a new interval for the stage the client just entered.
pub async fn insert_open<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
    stage: &str,
    entered_at: DateTime<Utc>,
) -> anyhow::Result<Model> {
    let model = Model {
        id: Uuid::new_v4().to_string(),
        client_id: client_id.to_string(),
        stage: stage.to_string(),
        entered_at,
        exited_at: None,
        duration_seconds: None,
    };
    let active = ActiveModel {
        id: Set(model.id.clone()),
        client_id: Set(model.client_id.clone()),
        stage: Set(model.stage.clone()),
        entered_at: Set(model.entered_at),
        exited_at: Set(None),
        duration_seconds: Set(None),
    };
    active.insert(db).await?;
    Ok(model)
}

/// The client's current interval, if the log is intact.
pub async fn find_open<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
) -> anyhow::Result<Option<Model>> {
    Ok(Entity::find()
        .filter(Column::ClientId.eq(client_id))
        .filter(Column::ExitedAt.is_null())
        .one(db)
        .await?)
}

pub async fn close<C: ConnectionTrait>(
    db: &C,
    entry: &Model,
    exited_at: DateTime<Utc>,
    duration_seconds: i64,
) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Unchanged(entry.id.clone()),
        exited_at: Set(Some(exited_at)),
        duration_seconds: Set(Some(duration_seconds)),
        ..Default::default()
    };
    active.update(db).await?;
    Ok(())
}

pub async fn list_for_client<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
    newest_first: bool,
) -> anyhow::Result<Vec<Model>> {
    let query = Entity::find().filter(Column::ClientId.eq(client_id));
    let query = if newest_first {
        query.order_by_desc(Column::EnteredAt)
    } else {
        query.order_by_asc(Column::EnteredAt)
    };
    Ok(query.all(db).await?)
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find().all(db).await?)
}

/// All open intervals, keyed by client in the service layer to annotate list
/// views in one query.
pub async fn list_open<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find()
        .filter(Column::ExitedAt.is_null())
        .all(db)
        .await?)
}

/// Distinct client ids that have at least one history entry.
pub async fn client_ids_with_history<C: ConnectionTrait>(
    db: &C,
) -> anyhow::Result<Vec<String>> {
    Ok(Entity::find()
        .select_only()
        .column(Column::ClientId)
        .distinct()
        .into_tuple::<String>()
        .all(db)
        .await?)
}
