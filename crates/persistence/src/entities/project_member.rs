//! Project membership database entity for SeaORM.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::Serialize;

use domain::ProjectAccessLevel;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "project_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub access_level: String,
    pub joined_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTimeUtc,
    pub updated_by: Option<Uuid>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn new(project_id: Uuid, user_id: Uuid, access_level: ProjectAccessLevel) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            access_level: access_level.to_string(),
            joined_at: now,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    pub fn access_level(&self) -> ProjectAccessLevel {
        ProjectAccessLevel::from(self.access_level.as_str())
    }
}
