//! Task service - Task lifecycle, assignment and workflow status.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use common::{OptionExt, Paginated, PaginationParams};
use domain::{
    ensure_date_order, Caller, TaskPriority, TaskStatus, ENTITY_PARENT_TASK, ENTITY_PROJECT,
    ENTITY_TASK, ENTITY_USER, FALLBACK_PROJECT_NAME, MSG_PARENT_OTHER_PROJECT,
    MSG_PROJECT_ARCHIVED,
};
use persistence::entities::task;
use persistence::{Persistence, ReadRepository, UnitOfWork, WriteRepository};

use super::error::{check, reject, require, ServiceResult};
use crate::notifier::{dispatch, Notification, NotificationKind, Notifier};

/// Input for [`TaskService::create_task`]
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_to_id: Option<Uuid>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: Option<i32>,
    #[serde(default)]
    pub parent_task_id: Option<Uuid>,
}

impl CreateTask {
    pub fn new(project_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            assigned_to_id: None,
            priority: TaskPriority::default(),
            start_date: None,
            due_date: None,
            estimated_hours: None,
            parent_task_id: None,
        }
    }
}

/// Input for [`TaskService::update_task`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<i32>,
    pub actual_hours: Option<i32>,
}

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn get_task(&self, id: Uuid) -> ServiceResult<task::Model>;

    async fn list_tasks(&self) -> ServiceResult<Vec<task::Model>>;

    async fn list_project_tasks(&self, project_id: Uuid) -> ServiceResult<Vec<task::Model>>;

    async fn list_assigned_tasks(&self, user_id: Uuid) -> ServiceResult<Vec<task::Model>>;

    /// Direct children of a task
    async fn list_subtasks(&self, task_id: Uuid) -> ServiceResult<Vec<task::Model>>;

    async fn list_tasks_paged(
        &self,
        params: PaginationParams,
    ) -> ServiceResult<Paginated<task::Model>>;

    /// Create a task in an existing, unarchived project
    async fn create_task(&self, input: CreateTask) -> ServiceResult<task::Model>;

    async fn update_task(&self, id: Uuid, input: UpdateTask) -> ServiceResult<task::Model>;

    async fn delete_task(&self, id: Uuid) -> ServiceResult<()>;

    /// Move a task through the workflow and tell its assignee
    async fn change_status(&self, id: Uuid, status: TaskStatus) -> ServiceResult<task::Model>;

    /// Hand a task to a user and tell them
    async fn assign_task(&self, id: Uuid, user_id: Uuid) -> ServiceResult<task::Model>;

    /// Remind assignees of unfinished tasks due within `window`.
    /// Waits for delivery and returns the number of reminders sent.
    async fn send_due_reminders(&self, window: Duration) -> ServiceResult<usize>;
}

/// Concrete implementation of TaskService using a unit of work per call.
pub struct TaskManager {
    persistence: Persistence,
    caller: Caller,
    notifier: Arc<dyn Notifier>,
}

impl TaskManager {
    pub fn new(persistence: Persistence, caller: Caller, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            persistence,
            caller,
            notifier,
        }
    }

    fn uow(&self) -> UnitOfWork {
        self.persistence.unit_of_work(&self.caller)
    }

    async fn load(&self, uow: &UnitOfWork, id: Uuid) -> ServiceResult<task::Model> {
        Ok(uow.tasks().get_by_id(id).await?.ok_or_not_found(ENTITY_TASK)?)
    }

    /// Notification for the task's assignee, if it has a live one
    async fn for_assignee(
        &self,
        uow: &UnitOfWork,
        task: &task::Model,
        kind: NotificationKind,
    ) -> ServiceResult<Option<Notification>> {
        let Some(assignee) = task.assigned_to_id else {
            return Ok(None);
        };

        Ok(uow
            .users()
            .get_by_id(assignee)
            .await?
            .map(|user| Notification::new(user.email.clone(), user.full_name(), kind)))
    }
}

#[async_trait]
impl TaskService for TaskManager {
    async fn get_task(&self, id: Uuid) -> ServiceResult<task::Model> {
        self.load(&self.uow(), id).await
    }

    async fn list_tasks(&self) -> ServiceResult<Vec<task::Model>> {
        Ok(self.uow().tasks().get_all().await?)
    }

    async fn list_project_tasks(&self, project_id: Uuid) -> ServiceResult<Vec<task::Model>> {
        Ok(self
            .uow()
            .tasks()
            .find(|t| t.project_id == project_id)
            .await?)
    }

    async fn list_assigned_tasks(&self, user_id: Uuid) -> ServiceResult<Vec<task::Model>> {
        Ok(self
            .uow()
            .tasks()
            .find(|t| t.assigned_to_id == Some(user_id))
            .await?)
    }

    async fn list_subtasks(&self, task_id: Uuid) -> ServiceResult<Vec<task::Model>> {
        let uow = self.uow();
        self.load(&uow, task_id).await?;

        Ok(uow
            .tasks()
            .find(|t| t.parent_task_id == Some(task_id))
            .await?)
    }

    async fn list_tasks_paged(
        &self,
        params: PaginationParams,
    ) -> ServiceResult<Paginated<task::Model>> {
        Ok(self.uow().tasks().get_paged(params.normalize()).await?)
    }

    async fn create_task(&self, input: CreateTask) -> ServiceResult<task::Model> {
        let uow = self.uow();

        let project = require(
            uow.projects().get_by_id(input.project_id).await?,
            ENTITY_PROJECT,
            input.project_id,
        )?;
        if project.is_archived {
            return reject(MSG_PROJECT_ARCHIVED);
        }
        check(ensure_date_order(input.start_date, input.due_date))?;

        if let Some(assignee) = input.assigned_to_id {
            require(uow.users().get_by_id(assignee).await?, ENTITY_USER, assignee)?;
        }
        if let Some(parent_id) = input.parent_task_id {
            let parent = require(
                uow.tasks().get_by_id(parent_id).await?,
                ENTITY_PARENT_TASK,
                parent_id,
            )?;
            if parent.project_id != project.id {
                return reject(MSG_PARENT_OTHER_PROJECT);
            }
        }

        let mut task = task::Model::new(project.id, input.title);
        task.description = input.description;
        task.assigned_to_id = input.assigned_to_id;
        task.status = TaskStatus::Todo.to_string();
        task.priority = input.priority.to_string();
        task.start_date = input.start_date;
        task.due_date = input.due_date;
        task.estimated_hours = input.estimated_hours;
        task.parent_task_id = input.parent_task_id;

        let task = uow.tasks().add(task);
        uow.save_changes().await?;

        tracing::info!(task_id = %task.id, project_id = %project.id, "Task created");
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, input: UpdateTask) -> ServiceResult<task::Model> {
        let uow = self.uow();
        let mut task = self.load(&uow, id).await?;

        if let Some(title) = input.title {
            task.title = title;
        }
        if input.description.is_some() {
            task.description = input.description;
        }
        if let Some(priority) = input.priority {
            task.priority = priority.to_string();
        }
        if input.start_date.is_some() {
            task.start_date = input.start_date;
        }
        if input.due_date.is_some() {
            task.due_date = input.due_date;
        }
        if input.estimated_hours.is_some() {
            task.estimated_hours = input.estimated_hours;
        }
        if input.actual_hours.is_some() {
            task.actual_hours = input.actual_hours;
        }
        check(ensure_date_order(task.start_date, task.due_date))?;

        let task = uow.tasks().update(task);
        uow.save_changes().await?;

        tracing::info!(task_id = %id, "Task updated");
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> ServiceResult<()> {
        let uow = self.uow();
        let task = self.load(&uow, id).await?;

        uow.tasks().remove(task);
        uow.save_changes().await?;

        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    async fn change_status(&self, id: Uuid, status: TaskStatus) -> ServiceResult<task::Model> {
        let uow = self.uow();
        let mut task = self.load(&uow, id).await?;

        let old_status = task.status();
        if old_status == status {
            return Ok(task);
        }
        task.status = status.to_string();

        let kind = NotificationKind::TaskStatusChanged {
            task_title: task.title.clone(),
            old_status,
            new_status: status,
        };
        let notification = self.for_assignee(&uow, &task, kind).await?;

        let task = uow.tasks().update(task);
        uow.save_changes().await?;
        tracing::info!(task_id = %id, from = %old_status, to = %status, "Task status changed");

        if let Some(notification) = notification {
            dispatch(self.notifier.clone(), notification);
        }
        Ok(task)
    }

    async fn assign_task(&self, id: Uuid, user_id: Uuid) -> ServiceResult<task::Model> {
        let uow = self.uow();
        let mut task = self.load(&uow, id).await?;
        let user = require(uow.users().get_by_id(user_id).await?, ENTITY_USER, user_id)?;

        let project_name = uow
            .projects()
            .get_by_id(task.project_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string());

        task.assigned_to_id = Some(user.id);
        let task = uow.tasks().update(task);
        uow.save_changes().await?;
        tracing::info!(task_id = %id, assignee = %user.id, "Task assigned");

        dispatch(
            self.notifier.clone(),
            Notification::new(
                user.email.clone(),
                user.full_name(),
                NotificationKind::TaskAssigned {
                    task_title: task.title.clone(),
                    project_name,
                },
            ),
        );
        Ok(task)
    }

    async fn send_due_reminders(&self, window: Duration) -> ServiceResult<usize> {
        let uow = self.uow();
        let now = Utc::now();
        let horizon = now + window;

        let due = uow
            .tasks()
            .find(|t| {
                t.assigned_to_id.is_some()
                    && !t.status().is_finished()
                    && t.due_date.is_some_and(|d| d >= now && d <= horizon)
            })
            .await?;

        let mut deliveries = Vec::new();
        for task in due {
            let Some(due_date) = task.due_date else {
                continue;
            };
            let kind = NotificationKind::TaskDueReminder {
                task_title: task.title.clone(),
                due_date,
            };
            if let Some(notification) = self.for_assignee(&uow, &task, kind).await? {
                deliveries.push(dispatch(self.notifier.clone(), notification));
            }
        }

        // Reminders are delivered before this returns
        let sent = deliveries.len();
        for delivery in deliveries {
            if let Err(e) = delivery.await {
                tracing::warn!(error = %e, "Reminder delivery task aborted");
            }
        }

        tracing::info!(sent, "Due reminders dispatched");
        Ok(sent)
    }
}
