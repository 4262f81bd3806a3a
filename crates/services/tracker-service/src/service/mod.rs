//! Domain services - Use cases of the task tracker.
//!
//! Every operation opens one unit of work, checks its preconditions against
//! stored state, stages its changes and saves once. Notifications go out
//! only after the save succeeded.

mod activity_log_service;
pub mod container;
mod error;
mod project_member_service;
mod project_service;
mod task_comment_service;
mod task_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

pub use error::{ServiceError, ServiceResult};

// Service traits, implementations and inputs
pub use activity_log_service::{ActivityLogManager, ActivityLogService, LogActivity};
pub use project_member_service::{ProjectMemberManager, ProjectMemberService};
pub use project_service::{CreateProject, ProjectManager, ProjectService, UpdateProject};
pub use task_comment_service::{AddComment, TaskCommentManager, TaskCommentService};
pub use task_service::{CreateTask, TaskManager, TaskService, UpdateTask};
pub use user_service::{CreateUser, UpdateUser, UserManager, UserService};
