//! User roles.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ROLE_ADMIN, ROLE_DEVELOPER, ROLE_PROJECT_MANAGER, ROLE_TEAM_LEAD, ROLE_VIEWER,
};

/// Organisation-wide role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    ProjectManager,
    TeamLead,
    Developer,
    Viewer,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::ProjectManager => ROLE_PROJECT_MANAGER,
            UserRole::TeamLead => ROLE_TEAM_LEAD,
            UserRole::Developer => ROLE_DEVELOPER,
            UserRole::Viewer => ROLE_VIEWER,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Developer
    }
}

/// Unknown values fall back to the least privileged role.
impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_PROJECT_MANAGER => UserRole::ProjectManager,
            ROLE_TEAM_LEAD => UserRole::TeamLead,
            ROLE_DEVELOPER => UserRole::Developer,
            _ => UserRole::Viewer,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
