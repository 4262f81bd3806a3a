//! Task attachment database entity for SeaORM.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    /// Size in bytes
    pub file_size: i64,
    pub content_type: String,
    pub uploaded_at: DateTimeUtc,
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
    pub fn new(
        task_id: Uuid,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_size: i64,
        content_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            task_id,
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size,
            content_type: content_type.into(),
            uploaded_at: now,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }
}
