//! Activity log service - Audit trail of who did what.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use common::OptionExt;
use domain::{Caller, ENTITY_ACTIVITY_LOG, ENTITY_PROJECT, ENTITY_TASK, ENTITY_USER};
use persistence::entities::activity_log;
use persistence::{Persistence, ReadRepository, UnitOfWork, WriteRepository};

use super::error::{require, ServiceResult};

/// Input for [`ActivityLogService::log_activity`]
#[derive(Debug, Clone, Deserialize)]
pub struct LogActivity {
    pub user_id: Uuid,
    pub action: String,
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
}

impl LogActivity {
    pub fn new(user_id: Uuid, action: impl Into<String>) -> Self {
        Self {
            user_id,
            action: action.into(),
            task_id: None,
            project_id: None,
            description: None,
            old_value: None,
            new_value: None,
        }
    }
}

/// Activity queries return the newest entry first.
#[async_trait]
pub trait ActivityLogService: Send + Sync {
    async fn get_activity(&self, id: Uuid) -> ServiceResult<activity_log::Model>;

    async fn task_activity(&self, task_id: Uuid) -> ServiceResult<Vec<activity_log::Model>>;

    async fn project_activity(&self, project_id: Uuid)
        -> ServiceResult<Vec<activity_log::Model>>;

    async fn user_activity(&self, user_id: Uuid) -> ServiceResult<Vec<activity_log::Model>>;

    async fn log_activity(&self, input: LogActivity) -> ServiceResult<activity_log::Model>;
}

/// Concrete implementation of ActivityLogService using a unit of work per call.
pub struct ActivityLogManager {
    persistence: Persistence,
    caller: Caller,
}

impl ActivityLogManager {
    pub fn new(persistence: Persistence, caller: Caller) -> Self {
        Self {
            persistence,
            caller,
        }
    }

    fn uow(&self) -> UnitOfWork {
        self.persistence.unit_of_work(&self.caller)
    }

    async fn newest_first<F>(
        &self,
        uow: &UnitOfWork,
        predicate: F,
    ) -> ServiceResult<Vec<activity_log::Model>>
    where
        F: Fn(&activity_log::Model) -> bool + Send + Sync,
    {
        let mut logs = uow.activity_logs().find(predicate).await?;
        logs.sort_by(|a, b| b.action_at.cmp(&a.action_at));
        Ok(logs)
    }
}

#[async_trait]
impl ActivityLogService for ActivityLogManager {
    async fn get_activity(&self, id: Uuid) -> ServiceResult<activity_log::Model> {
        Ok(self
            .uow()
            .activity_logs()
            .get_by_id(id)
            .await?
            .ok_or_not_found(ENTITY_ACTIVITY_LOG)?)
    }

    async fn task_activity(&self, task_id: Uuid) -> ServiceResult<Vec<activity_log::Model>> {
        let uow = self.uow();
        require(uow.tasks().get_by_id(task_id).await?, ENTITY_TASK, task_id)?;

        self.newest_first(&uow, |l| l.task_id == Some(task_id)).await
    }

    async fn project_activity(
        &self,
        project_id: Uuid,
    ) -> ServiceResult<Vec<activity_log::Model>> {
        let uow = self.uow();
        require(
            uow.projects().get_by_id(project_id).await?,
            ENTITY_PROJECT,
            project_id,
        )?;

        self.newest_first(&uow, |l| l.project_id == Some(project_id))
            .await
    }

    async fn user_activity(&self, user_id: Uuid) -> ServiceResult<Vec<activity_log::Model>> {
        let uow = self.uow();
        require(uow.users().get_by_id(user_id).await?, ENTITY_USER, user_id)?;

        self.newest_first(&uow, |l| l.user_id == user_id).await
    }

    async fn log_activity(&self, input: LogActivity) -> ServiceResult<activity_log::Model> {
        let uow = self.uow();
        require(
            uow.users().get_by_id(input.user_id).await?,
            ENTITY_USER,
            input.user_id,
        )?;
        if let Some(task_id) = input.task_id {
            require(uow.tasks().get_by_id(task_id).await?, ENTITY_TASK, task_id)?;
        }
        if let Some(project_id) = input.project_id {
            require(
                uow.projects().get_by_id(project_id).await?,
                ENTITY_PROJECT,
                project_id,
            )?;
        }

        let mut entry = activity_log::Model::new(input.user_id, input.action);
        entry.task_id = input.task_id;
        entry.project_id = input.project_id;
        entry.description = input.description;
        entry.old_value = input.old_value;
        entry.new_value = input.new_value;

        let entry = uow.activity_logs().add(entry);
        uow.save_changes().await?;

        tracing::debug!(log_id = %entry.id, action = %entry.action, "Activity logged");
        Ok(entry)
    }
}
