use serde::{Deserialize, Serialize};

use plm_core::UserId;

use crate::roles::Role;

/// The signed-in user acting on products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            user_id,
            username: username.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::ADMIN)
    }

    pub fn can_delete_products(&self) -> bool {
        self.is_admin()
    }

    pub fn can_set_stage(&self) -> bool {
        self.is_admin()
    }
}

/// Source of the current actor.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Principal>;

    fn current_actor(&self) -> Option<UserId> {
        self.current().map(|p| p.user_id)
    }
}

/// Fixed identity, for single-user sessions and tests.
#[derive(Debug, Clone)]
pub struct StaticIdentity(Option<Principal>);

impl StaticIdentity {
    pub fn signed_in(principal: Principal) -> Self {
        Self(Some(principal))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<Principal> {
        self.0.clone()
    }
}
