//! Domain-level constants.
//!
//! These constants define business rules and the wording of outcomes
//! reported to callers.

// =============================================================================
// User Roles
// =============================================================================

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PROJECT_MANAGER: &str = "project_manager";
pub const ROLE_TEAM_LEAD: &str = "team_lead";
pub const ROLE_DEVELOPER: &str = "developer";
pub const ROLE_VIEWER: &str = "viewer";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_PROJECT_MANAGER,
    ROLE_TEAM_LEAD,
    ROLE_DEVELOPER,
    ROLE_VIEWER,
];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Pagination
// =============================================================================

/// Page number used when the caller asks for a page below 1
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Page size used when the caller asks for an out-of-range size
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u64 = 100;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Avatar assigned to newly created users
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

// =============================================================================
// Entity names (used in not-found and conflict outcomes)
// =============================================================================

pub const ENTITY_USER: &str = "User";
pub const ENTITY_PROJECT: &str = "Project";
pub const ENTITY_PROJECT_MEMBER: &str = "Project member";
pub const ENTITY_TASK: &str = "Task";
pub const ENTITY_PARENT_TASK: &str = "Parent task";
pub const ENTITY_COMMENT: &str = "Comment";
pub const ENTITY_ATTACHMENT: &str = "Attachment";
pub const ENTITY_ACTIVITY_LOG: &str = "Activity log";

// =============================================================================
// Messages
// =============================================================================

pub const MSG_END_BEFORE_START: &str = "Due date must be greater than start date";
pub const MSG_ALREADY_MEMBER: &str = "User is already a member of this project";
pub const MSG_EMAIL_TAKEN: &str = "Email already exists";
pub const MSG_PARENT_OTHER_PROJECT: &str = "Parent task belongs to a different project";
pub const MSG_PROJECT_ARCHIVED: &str = "Project is archived";

/// Project name used in assignment notifications when the project is gone
pub const FALLBACK_PROJECT_NAME: &str = "Task Management Project";
