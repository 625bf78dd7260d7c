//! Authentication and Authorization Model
//!
//! Identity and permissions of the logged-in user, plus the derived access
//! view used by routing and navigation decisions.

pub mod context;
pub mod identity;
pub mod permissions;

pub use context::AccessContext;
pub use identity::{
    department_label, Department, Role, RoleInfo, RoleTier, UserProfile, UserUpdate, DEPARTMENTS,
    ROLE_CATALOGUE,
};
pub use permissions::{Capability, PermissionSet};
