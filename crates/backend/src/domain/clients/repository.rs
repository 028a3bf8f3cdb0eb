//! Normalized client storage. The stored row keeps foreign keys to users and
//! services; denormalization into the API shape happens in the service layer.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage: String,
    pub status: Option<String>,
    pub value: f64,
    pub priority: String,
    pub country: Option<String>,
    pub responsible_person_id: Option<String>,
    pub service_id: Option<String>,
    pub notes: Option<String>,
    pub linkedin: Option<String>,
    pub source: Option<String>,
    pub industry: Option<String>,
    pub estimated_close_date: Option<DateTime<Utc>>,
    pub win_probability: Option<i32>,
    pub last_follow_up: Option<DateTime<Utc>>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub pipeline_start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::users::repository::Entity",
        from = "Column::ResponsiblePersonId",
        to = "crate::domain::users::repository::Column::Id"
    )]
    ResponsiblePerson,
    #[sea_orm(
        belongs_to = "crate::domain::services_catalog::repository::Entity",
        from = "Column::ServiceId",
        to = "crate::domain::services_catalog::repository::Column::Id"
    )]
    Service,
}

impl ActiveModelBehavior for ActiveModel {}

fn to_active(m: &Model) -> ActiveModel {
    ActiveModel {
        id: Set(m.id.clone()),
        company_name: Set(m.company_name.clone()),
        contact_person: Set(m.contact_person.clone()),
        email: Set(m.email.clone()),
        phone: Set(m.phone.clone()),
        stage: Set(m.stage.clone()),
        status: Set(m.status.clone()),
        value: Set(m.value),
        priority: Set(m.priority.clone()),
        country: Set(m.country.clone()),
        responsible_person_id: Set(m.responsible_person_id.clone()),
        service_id: Set(m.service_id.clone()),
        notes: Set(m.notes.clone()),
        linkedin: Set(m.linkedin.clone()),
        source: Set(m.source.clone()),
        industry: Set(m.industry.clone()),
        estimated_close_date: Set(m.estimated_close_date),
        win_probability: Set(m.win_probability),
        last_follow_up: Set(m.last_follow_up),
        next_follow_up: Set(m.next_follow_up),
        pipeline_start_date: Set(m.pipeline_start_date),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, model: &Model) -> anyhow::Result<()> {
    to_active(model).insert(db).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(db: &C, model: &Model) -> anyhow::Result<()> {
    to_active(model).update(db).await?;
    Ok(())
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> anyhow::Result<Option<Model>> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Model>> {
    Ok(Entity::find()
        .order_by_desc(Column::UpdatedAt)
        .all(db)
        .await?)
}

/// Hard delete; dependent activities and stage-history rows go with it via
/// the cascade declared in the schema.
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
