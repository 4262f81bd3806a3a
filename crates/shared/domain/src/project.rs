//! Project membership levels and scheduling rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MSG_END_BEFORE_START;
use crate::error::{DomainError, DomainResult};

/// Access a member holds within one project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectAccessLevel {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl ProjectAccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectAccessLevel::Owner => "owner",
            ProjectAccessLevel::Admin => "admin",
            ProjectAccessLevel::Member => "member",
            ProjectAccessLevel::Viewer => "viewer",
        }
    }

    /// Owners and admins may change the project's membership
    pub fn can_manage_members(&self) -> bool {
        matches!(self, ProjectAccessLevel::Owner | ProjectAccessLevel::Admin)
    }
}

impl Default for ProjectAccessLevel {
    fn default() -> Self {
        ProjectAccessLevel::Member
    }
}

impl From<&str> for ProjectAccessLevel {
    fn from(s: &str) -> Self {
        match s {
            "owner" => ProjectAccessLevel::Owner,
            "admin" => ProjectAccessLevel::Admin,
            "member" => ProjectAccessLevel::Member,
            _ => ProjectAccessLevel::Viewer,
        }
    }
}

impl std::fmt::Display for ProjectAccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject a schedule whose end falls before its start.
///
/// Either bound may be open; an open bound never violates the rule.
pub fn ensure_date_order(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> DomainResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(DomainError::invalid_state(MSG_END_BEFORE_START))
        }
        _ => Ok(()),
    }
}
