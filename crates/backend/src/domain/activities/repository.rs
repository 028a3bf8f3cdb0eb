//! Per-client audit log. Append and delete only, never updated in place.
//! Rows are removed automatically when their client is deleted (cascade).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_id: String,
    pub action: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
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

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
    action: &str,
    user_id: Option<String>,
) -> anyhow::Result<Model> {
    let model = Model {
        id: Uuid::new_v4().to_string(),
        client_id: client_id.to_string(),
        action: action.to_string(),
        user_id,
        created_at: Utc::now(),
    };
    let active = ActiveModel {
        id: Set(model.id.clone()),
        client_id: Set(model.client_id.clone()),
        action: Set(model.action.clone()),
        user_id: Set(model.user_id.clone()),
        created_at: Set(model.created_at),
    };
    active.insert(db).await?;
    Ok(model)
}

/// Delete by id, scoped to the owning client.
pub async fn delete<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
    activity_id: &str,
) -> anyhow::Result<bool> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(activity_id))
        .filter(Column::ClientId.eq(client_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Most-recent-first log for one client.
pub async fn list_for_client<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find()
        .filter(Column::ClientId.eq(client_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// All activities, most recent first; used to assemble list views without a
/// per-client query.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}
