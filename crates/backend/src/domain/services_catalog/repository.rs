//! Service catalog. Free-text names, unique; referenced by clients through a
//! foreign key and resolved back to the display name on every read.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, QueryOrder, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn new_active(name: &str) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.trim().to_string()),
        created_at: Set(Utc::now()),
    }
}

/// Insert a new service; `None` when the name is already taken.
pub async fn create<C: ConnectionTrait>(db: &C, name: &str) -> anyhow::Result<Option<Model>> {
    let trimmed = name.trim();
    let insert = Entity::insert(new_active(trimmed))
        .on_conflict(OnConflict::column(Column::Name).do_nothing().to_owned())
        .exec(db)
        .await;
    match insert {
        Ok(_) => {}
        Err(DbErr::RecordNotInserted) => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    Ok(Entity::find()
        .filter(Column::Name.eq(trimmed))
        .one(db)
        .await?)
}

/// Upsert by unique name, same shape as `users::repository::get_or_create`.
pub async fn get_or_create<C: ConnectionTrait>(db: &C, name: &str) -> anyhow::Result<Model> {
    let trimmed = name.trim();
    let insert = Entity::insert(new_active(trimmed))
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
        .ok_or_else(|| anyhow::anyhow!("service \"{trimmed}\" missing after upsert"))
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find().order_by_asc(Column::Name).all(db).await?)
}
