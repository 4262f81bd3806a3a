//! Project service - Project lifecycle and ownership.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use common::{OptionExt, Paginated, PaginationParams};
use domain::{ensure_date_order, Caller, ProjectAccessLevel, ENTITY_PROJECT, ENTITY_USER};
use persistence::entities::{project, project_member};
use persistence::{Persistence, ReadRepository, UnitOfWork, WriteRepository};

use super::error::{check, require, ServiceResult};

/// Input for [`ProjectService::create_project`]
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Input for [`ProjectService::update_project`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn get_project(&self, id: Uuid) -> ServiceResult<project::Model>;

    async fn list_projects(&self) -> ServiceResult<Vec<project::Model>>;

    async fn list_owned_projects(&self, owner_id: Uuid) -> ServiceResult<Vec<project::Model>>;

    async fn list_projects_paged(
        &self,
        params: PaginationParams,
    ) -> ServiceResult<Paginated<project::Model>>;

    /// Create a project owned by the caller, who also joins it as owner
    async fn create_project(&self, input: CreateProject) -> ServiceResult<project::Model>;

    async fn update_project(&self, id: Uuid, input: UpdateProject)
        -> ServiceResult<project::Model>;

    async fn delete_project(&self, id: Uuid) -> ServiceResult<()>;

    async fn archive_project(&self, id: Uuid) -> ServiceResult<project::Model>;
}

/// Concrete implementation of ProjectService using a unit of work per call.
pub struct ProjectManager {
    persistence: Persistence,
    caller: Caller,
}

impl ProjectManager {
    pub fn new(persistence: Persistence, caller: Caller) -> Self {
        Self {
            persistence,
            caller,
        }
    }

    fn uow(&self) -> UnitOfWork {
        self.persistence.unit_of_work(&self.caller)
    }

    async fn load(&self, uow: &UnitOfWork, id: Uuid) -> ServiceResult<project::Model> {
        Ok(uow
            .projects()
            .get_by_id(id)
            .await?
            .ok_or_not_found(ENTITY_PROJECT)?)
    }
}

#[async_trait]
impl ProjectService for ProjectManager {
    async fn get_project(&self, id: Uuid) -> ServiceResult<project::Model> {
        self.load(&self.uow(), id).await
    }

    async fn list_projects(&self) -> ServiceResult<Vec<project::Model>> {
        Ok(self.uow().projects().get_all().await?)
    }

    async fn list_owned_projects(&self, owner_id: Uuid) -> ServiceResult<Vec<project::Model>> {
        Ok(self
            .uow()
            .projects()
            .find(|p| p.owner_id == owner_id)
            .await?)
    }

    async fn list_projects_paged(
        &self,
        params: PaginationParams,
    ) -> ServiceResult<Paginated<project::Model>> {
        Ok(self.uow().projects().get_paged(params.normalize()).await?)
    }

    async fn create_project(&self, input: CreateProject) -> ServiceResult<project::Model> {
        let uow = self.uow();
        let owner_id = self.caller.user_id;

        check(ensure_date_order(Some(input.start_date), input.end_date))?;
        require(uow.users().get_by_id(owner_id).await?, ENTITY_USER, owner_id)?;

        let mut project = project::Model::new(input.name, owner_id, input.start_date);
        project.description = input.description;
        project.end_date = input.end_date;

        let project = uow.projects().add(project);
        uow.project_members().add(project_member::Model::new(
            project.id,
            owner_id,
            ProjectAccessLevel::Owner,
        ));
        uow.save_changes().await?;

        tracing::info!(project_id = %project.id, owner = %owner_id, "Project created");
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        input: UpdateProject,
    ) -> ServiceResult<project::Model> {
        let uow = self.uow();
        let mut project = self.load(&uow, id).await?;

        if let Some(name) = input.name {
            project.name = name;
        }
        if input.description.is_some() {
            project.description = input.description;
        }
        if let Some(start) = input.start_date {
            project.start_date = start;
        }
        if input.end_date.is_some() {
            project.end_date = input.end_date;
        }
        check(ensure_date_order(Some(project.start_date), project.end_date))?;

        let project = uow.projects().update(project);
        uow.save_changes().await?;

        tracing::info!(project_id = %id, "Project updated");
        Ok(project)
    }

    async fn delete_project(&self, id: Uuid) -> ServiceResult<()> {
        let uow = self.uow();
        let project = self.load(&uow, id).await?;

        uow.projects().remove(project);
        uow.save_changes().await?;

        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    async fn archive_project(&self, id: Uuid) -> ServiceResult<project::Model> {
        let uow = self.uow();
        let mut project = self.load(&uow, id).await?;
        if project.is_archived {
            return Ok(project);
        }

        project.is_archived = true;
        let project = uow.projects().update(project);
        uow.save_changes().await?;

        tracing::info!(project_id = %id, "Project archived");
        Ok(project)
    }
}
