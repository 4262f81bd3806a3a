//! Task comment service - Discussion on tasks.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use common::OptionExt;
use domain::{Caller, ENTITY_COMMENT, ENTITY_TASK, ENTITY_USER};
use persistence::entities::task_comment;
use persistence::{Persistence, ReadRepository, UnitOfWork, WriteRepository};

use super::error::{require, ServiceResult};
use crate::notifier::{dispatch, Notification, NotificationKind, Notifier};

/// Input for [`TaskCommentService::add_comment`]
#[derive(Debug, Clone, Deserialize)]
pub struct AddComment {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
}

#[async_trait]
pub trait TaskCommentService: Send + Sync {
    async fn get_comment(&self, id: Uuid) -> ServiceResult<task_comment::Model>;

    async fn list_task_comments(&self, task_id: Uuid) -> ServiceResult<Vec<task_comment::Model>>;

    /// Comment on a task and tell its assignee
    async fn add_comment(&self, input: AddComment) -> ServiceResult<task_comment::Model>;

    async fn update_comment(&self, id: Uuid, content: String)
        -> ServiceResult<task_comment::Model>;

    async fn delete_comment(&self, id: Uuid) -> ServiceResult<()>;
}

/// Concrete implementation of TaskCommentService using a unit of work per call.
pub struct TaskCommentManager {
    persistence: Persistence,
    caller: Caller,
    notifier: Arc<dyn Notifier>,
}

impl TaskCommentManager {
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

    async fn load(&self, uow: &UnitOfWork, id: Uuid) -> ServiceResult<task_comment::Model> {
        Ok(uow
            .task_comments()
            .get_by_id(id)
            .await?
            .ok_or_not_found(ENTITY_COMMENT)?)
    }
}

#[async_trait]
impl TaskCommentService for TaskCommentManager {
    async fn get_comment(&self, id: Uuid) -> ServiceResult<task_comment::Model> {
        self.load(&self.uow(), id).await
    }

    async fn list_task_comments(&self, task_id: Uuid) -> ServiceResult<Vec<task_comment::Model>> {
        let uow = self.uow();
        require(uow.tasks().get_by_id(task_id).await?, ENTITY_TASK, task_id)?;

        Ok(uow
            .task_comments()
            .find(|c| c.task_id == task_id)
            .await?)
    }

    async fn add_comment(&self, input: AddComment) -> ServiceResult<task_comment::Model> {
        let uow = self.uow();
        let task = require(
            uow.tasks().get_by_id(input.task_id).await?,
            ENTITY_TASK,
            input.task_id,
        )?;
        let author = require(
            uow.users().get_by_id(input.user_id).await?,
            ENTITY_USER,
            input.user_id,
        )?;

        // Authors are not told about their own comments
        let recipient = match task.assigned_to_id {
            Some(assignee) if assignee != author.id => uow.users().get_by_id(assignee).await?,
            _ => None,
        };

        let comment = uow.task_comments().add(task_comment::Model::new(
            task.id,
            author.id,
            input.content,
        ));
        uow.save_changes().await?;
        tracing::info!(comment_id = %comment.id, task_id = %task.id, "Comment added");

        if let Some(recipient) = recipient {
            dispatch(
                self.notifier.clone(),
                Notification::new(
                    recipient.email.clone(),
                    recipient.full_name(),
                    NotificationKind::CommentAdded {
                        task_title: task.title,
                        commenter_name: author.full_name(),
                        content: comment.content.clone(),
                    },
                ),
            );
        }
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        content: String,
    ) -> ServiceResult<task_comment::Model> {
        let uow = self.uow();
        let mut comment = self.load(&uow, id).await?;

        comment.content = content;
        let comment = uow.task_comments().update(comment);
        uow.save_changes().await?;

        tracing::info!(comment_id = %id, "Comment updated");
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> ServiceResult<()> {
        let uow = self.uow();
        let comment = self.load(&uow, id).await?;

        uow.task_comments().remove(comment);
        uow.save_changes().await?;

        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }
}
