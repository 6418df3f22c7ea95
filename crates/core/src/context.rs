//! Request-scoped identity.
//!
//! Operations that depend on who is calling take a [`RequestContext`]
//! explicitly instead of reading an ambient "current user".

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// The authenticated caller of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub actor_id: DbId,
    pub role: String,
}

impl RequestContext {
    pub fn new(actor_id: DbId, role: impl Into<String>) -> Self {
        Self {
            actor_id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Allow the call if the actor is an admin or owns the resource.
    pub fn ensure_owner_or_admin(&self, owner_id: DbId) -> Result<(), CoreError> {
        if self.is_admin() || self.actor_id == owner_id {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Not allowed to access another customer's appointment".into(),
            ))
        }
    }
}
