//! Domain layer - Business vocabulary of the task tracker.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the enumerations stored on tasks, projects, memberships and users, the
//! authenticated caller identity, and the business rules shared by services.

pub mod caller;
pub mod constants;
pub mod error;
pub mod password;
pub mod project;
pub mod task;
pub mod user;

pub use caller::Caller;
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use project::{ensure_date_order, ProjectAccessLevel};
pub use task::{TaskPriority, TaskStatus};
pub use user::UserRole;
