//! Service Container - Per-request access to every domain service.
//!
//! A container is built for one caller. Each service call it hands out opens
//! its own unit of work over the shared connection pool.

use std::sync::Arc;

use domain::Caller;
use persistence::Persistence;

use super::{
    ActivityLogManager, ActivityLogService, ProjectManager, ProjectMemberManager,
    ProjectMemberService, ProjectService, TaskCommentManager, TaskCommentService, TaskManager,
    TaskService, UserManager, UserService,
};
use crate::notifier::Notifier;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn tasks(&self) -> Arc<dyn TaskService>;

    fn projects(&self) -> Arc<dyn ProjectService>;

    fn members(&self) -> Arc<dyn ProjectMemberService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn comments(&self) -> Arc<dyn TaskCommentService>;

    fn activity(&self) -> Arc<dyn ActivityLogService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    tasks: Arc<dyn TaskService>,
    projects: Arc<dyn ProjectService>,
    members: Arc<dyn ProjectMemberService>,
    users: Arc<dyn UserService>,
    comments: Arc<dyn TaskCommentService>,
    activity: Arc<dyn ActivityLogService>,
}

impl Services {
    /// Create the services acting on behalf of `caller`
    pub fn new(persistence: Persistence, notifier: Arc<dyn Notifier>, caller: Caller) -> Self {
        Self {
            tasks: Arc::new(TaskManager::new(
                persistence.clone(),
                caller,
                notifier.clone(),
            )),
            projects: Arc::new(ProjectManager::new(persistence.clone(), caller)),
            members: Arc::new(ProjectMemberManager::new(
                persistence.clone(),
                caller,
                notifier.clone(),
            )),
            users: Arc::new(UserManager::new(persistence.clone(), caller)),
            comments: Arc::new(TaskCommentManager::new(
                persistence.clone(),
                caller,
                notifier,
            )),
            activity: Arc::new(ActivityLogManager::new(persistence, caller)),
        }
    }
}

impl ServiceContainer for Services {
    fn tasks(&self) -> Arc<dyn TaskService> {
        self.tasks.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectService> {
        self.projects.clone()
    }

    fn members(&self) -> Arc<dyn ProjectMemberService> {
        self.members.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn comments(&self) -> Arc<dyn TaskCommentService> {
        self.comments.clone()
    }

    fn activity(&self) -> Arc<dyn ActivityLogService> {
        self.activity.clone()
    }
}
