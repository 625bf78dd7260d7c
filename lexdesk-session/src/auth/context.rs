//! Access Context
//!
//! A read-only view of "who is asking" derived from the session on every
//! render. Nothing here is cached between renders.

use super::{Capability, PermissionSet, Role, UserProfile};

/// Access context for authorization decisions
#[derive(Debug, Clone)]
pub struct AccessContext {
    /// Role of the current user (None when logged out)
    pub role: Option<Role>,
    /// Effective permissions; empty when logged out
    pub permissions: PermissionSet,
    /// Role that bypasses all permission checks
    pub owner_role: Role,
}

impl AccessContext {
    /// Context for a logged-in user
    pub fn for_user(user: &UserProfile, owner_role: Role) -> Self {
        Self {
            role: Some(user.role.clone()),
            permissions: user.permissions.clone(),
            owner_role,
        }
    }

    /// Context for nobody: no role, no capabilities
    pub fn anonymous(owner_role: Role) -> Self {
        Self {
            role: None,
            permissions: PermissionSet::none(),
            owner_role,
        }
    }

    /// Context from an optional user, as read from the session
    pub fn from_user(user: Option<&UserProfile>, owner_role: Role) -> Self {
        match user {
            Some(user) => Self::for_user(user, owner_role),
            None => Self::anonymous(owner_role),
        }
    }

    /// Check if the current role is the owner role
    pub fn is_owner(&self) -> bool {
        self.role.as_ref() == Some(&self.owner_role)
    }

    /// Check a capability; the owner implicitly holds all of them
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.is_owner() || self.permissions.grants(capability)
    }

    /// Settings management or owner role
    pub fn can_administer(&self) -> bool {
        self.has_capability(Capability::ManageSettings)
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.is_owner() || self.permissions.has_module(module)
    }

    /// Create a summary string for logging
    pub fn summary(&self) -> String {
        let role = self
            .role
            .as_ref()
            .map(Role::as_str)
            .unwrap_or("anonymous");
        format!(
            "AccessContext[role={}, owner={}, {}]",
            role,
            self.is_owner(),
            self.permissions.summary()
        )
    }
}
