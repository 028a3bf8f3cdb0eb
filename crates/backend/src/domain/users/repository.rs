//! Responsible persons, created lazily when a client or activity names them.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Upsert by unique name: the insert carries an `ON CONFLICT DO NOTHING` so
/// two racing callers converge on the same row instead of read-then-insert.
pub async fn get_or_create<C: ConnectionTrait>(db: &C, name: &str) -> anyhow::Result<Model> {
    let trimmed = name.trim();
    let insert = Entity::insert(ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(trimmed.to_string()),
        created_at: Set(Utc::now()),
    })
    .on_conflict(OnConflict::column(Column::Name).do_nothing().to_owned())
    .exec(db)
    .await;
    match insert {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }
    Entity::find()
        .filter(Column::Name.eq(trimmed))
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user \"{trimmed}\" missing after upsert"))
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find().all(db).await?)
}
