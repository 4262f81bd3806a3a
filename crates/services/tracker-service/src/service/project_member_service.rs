//! Project member service - Who belongs to which project, and how.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::OptionExt;
use domain::{
    Caller, ProjectAccessLevel, ENTITY_PROJECT, ENTITY_PROJECT_MEMBER, ENTITY_USER,
    MSG_ALREADY_MEMBER,
};
use persistence::entities::project_member;
use persistence::{Persistence, ReadRepository, UnitOfWork, WriteRepository};

use super::error::{conflict_as, require, ServiceError, ServiceResult};
use crate::notifier::{dispatch, Notification, NotificationKind, Notifier};

/// Inviter shown when the project owner is no longer around
const UNKNOWN_INVITER: &str = "The project owner";

#[async_trait]
pub trait ProjectMemberService: Send + Sync {
    async fn get_member(&self, id: Uuid) -> ServiceResult<project_member::Model>;

    async fn list_project_members(
        &self,
        project_id: Uuid,
    ) -> ServiceResult<Vec<project_member::Model>>;

    async fn list_user_memberships(
        &self,
        user_id: Uuid,
    ) -> ServiceResult<Vec<project_member::Model>>;

    /// Enrol a user and send them an invitation
    async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        access_level: ProjectAccessLevel,
    ) -> ServiceResult<project_member::Model>;

    async fn remove_member(&self, id: Uuid) -> ServiceResult<()>;

    async fn update_access_level(
        &self,
        id: Uuid,
        access_level: ProjectAccessLevel,
    ) -> ServiceResult<project_member::Model>;
}

/// Concrete implementation of ProjectMemberService using a unit of work per call.
pub struct ProjectMemberManager {
    persistence: Persistence,
    caller: Caller,
    notifier: Arc<dyn Notifier>,
}

impl ProjectMemberManager {
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

    async fn load(&self, uow: &UnitOfWork, id: Uuid) -> ServiceResult<project_member::Model> {
        Ok(uow
            .project_members()
            .get_by_id(id)
            .await?
            .ok_or_not_found(ENTITY_PROJECT_MEMBER)?)
    }
}

#[async_trait]
impl ProjectMemberService for ProjectMemberManager {
    async fn get_member(&self, id: Uuid) -> ServiceResult<project_member::Model> {
        self.load(&self.uow(), id).await
    }

    async fn list_project_members(
        &self,
        project_id: Uuid,
    ) -> ServiceResult<Vec<project_member::Model>> {
        let uow = self.uow();
        require(
            uow.projects().get_by_id(project_id).await?,
            ENTITY_PROJECT,
            project_id,
        )?;

        Ok(uow
            .project_members()
            .find(|m| m.project_id == project_id)
            .await?)
    }

    async fn list_user_memberships(
        &self,
        user_id: Uuid,
    ) -> ServiceResult<Vec<project_member::Model>> {
        let uow = self.uow();
        require(uow.users().get_by_id(user_id).await?, ENTITY_USER, user_id)?;

        Ok(uow
            .project_members()
            .find(|m| m.user_id == user_id)
            .await?)
    }

    async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        access_level: ProjectAccessLevel,
    ) -> ServiceResult<project_member::Model> {
        let uow = self.uow();
        let project = require(
            uow.projects().get_by_id(project_id).await?,
            ENTITY_PROJECT,
            project_id,
        )?;
        let user = require(uow.users().get_by_id(user_id).await?, ENTITY_USER, user_id)?;

        let already = uow
            .project_members()
            .any(|m| m.project_id == project_id && m.user_id == user_id)
            .await?;
        if already {
            tracing::warn!(%project_id, %user_id, "Precondition failed: already a member");
            return Err(ServiceError::conflict(MSG_ALREADY_MEMBER));
        }

        let inviter_name = uow
            .users()
            .get_by_id(project.owner_id)
            .await?
            .map(|owner| owner.full_name())
            .unwrap_or_else(|| UNKNOWN_INVITER.to_string());

        let member = uow
            .project_members()
            .add(project_member::Model::new(project_id, user_id, access_level));
        uow.save_changes()
            .await
            .map_err(conflict_as(MSG_ALREADY_MEMBER))?;
        tracing::info!(%project_id, %user_id, level = %access_level, "Member added");

        dispatch(
            self.notifier.clone(),
            Notification::new(
                user.email.clone(),
                user.full_name(),
                NotificationKind::ProjectInvitation {
                    project_name: project.name,
                    inviter_name,
                },
            ),
        );
        Ok(member)
    }

    async fn remove_member(&self, id: Uuid) -> ServiceResult<()> {
        let uow = self.uow();
        let member = self.load(&uow, id).await?;

        uow.project_members().remove(member);
        uow.save_changes().await?;

        tracing::info!(member_id = %id, "Member removed");
        Ok(())
    }

    async fn update_access_level(
        &self,
        id: Uuid,
        access_level: ProjectAccessLevel,
    ) -> ServiceResult<project_member::Model> {
        let uow = self.uow();
        let mut member = self.load(&uow, id).await?;

        member.access_level = access_level.to_string();
        let member = uow.project_members().update(member);
        uow.save_changes().await?;

        tracing::info!(member_id = %id, level = %access_level, "Access level changed");
        Ok(member)
    }
}
