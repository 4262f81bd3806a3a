//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserRole;

/// Identity of whoever issued the current request.
///
/// Produced by token verification outside this workspace and handed to
/// services as-is. `system()` stands in for background work that acts on
/// nobody's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Caller {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn system() -> Self {
        Self {
            user_id: Uuid::nil(),
            role: UserRole::Admin,
        }
    }

    pub fn is_system(&self) -> bool {
        self.user_id.is_nil()
    }

    /// Id recorded in `created_by`/`updated_by` columns
    pub fn actor_id(&self) -> Option<Uuid> {
        (!self.is_system()).then_some(self.user_id)
    }
}
