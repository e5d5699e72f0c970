use serde::{Deserialize, Serialize};

use campay_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// Authenticated caller identity for a single request.
///
/// Constructed once at the transport boundary (from validated claims or
/// trusted gateway headers) and passed into every ledger operation. This is
/// the only place role checks happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    user_id: UserId,
    role: Role,
}

impl AuthContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn member(user_id: UserId) -> Self {
        Self::new(user_id, Role::Member)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Gate for admin-only operations.
    pub fn require_admin(&self) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}
