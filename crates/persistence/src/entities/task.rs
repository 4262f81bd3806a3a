//! Task database entity for SeaORM.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::Serialize;

use domain::{TaskPriority, TaskStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub project_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub status: String,
    pub priority: String,
    pub start_date: Option<DateTimeUtc>,
    pub due_date: Option<DateTimeUtc>,
    pub estimated_hours: Option<i32>,
    pub actual_hours: Option<i32>,
    /// Set for subtasks; always a task of the same project
    pub parent_task_id: Option<Uuid>,
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
    pub fn new(project_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            project_id,
            assigned_to_id: None,
            status: TaskStatus::default().to_string(),
            priority: TaskPriority::default().to_string(),
            start_date: None,
            due_date: None,
            estimated_hours: None,
            actual_hours: None,
            parent_task_id: None,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from(self.status.as_str())
    }

    pub fn priority(&self) -> TaskPriority {
        TaskPriority::from(self.priority.as_str())
    }
}
