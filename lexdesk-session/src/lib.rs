//! LexDesk Session - identity, access and navigation for the practice client
//!
//! This crate holds everything that decides what the signed-in user may see:
//!
//! - The session store with its persisted `{user, token}` pair
//! - The role and capability model attached to each user
//! - The route guard in front of the protected views
//! - The navigation filter that trims the sidebar per user
//!
//! ## Architecture
//!
//! Decisions are pure functions over a snapshot of the session:
//! - **Session** (`session`): owns and persists the current identity
//! - **Access** (`auth`, `routing`, `navigation`): read-only views over it
//! - **Transport** (lexdesk-client): talks to the backend and feeds the store

pub mod auth;
pub mod navigation;
pub mod routing;
pub mod session;

pub use auth::{
    AccessContext, Capability, Department, PermissionSet, Role, RoleInfo, RoleTier, UserProfile,
    UserUpdate,
};
pub use navigation::{
    default_menu, filter_menu, is_active, MenuItem, MenuSection, NavigationFilter,
    NavigationState,
};
pub use routing::{AppRoute, GuardDecision, RouteGuard};
pub use session::{
    FileSessionStorage, MemorySessionStorage, SessionContext, SessionSnapshot, SessionStorage,
    SessionStore,
};

pub use lexdesk_core::{LexError, LexResult, NavigationPolicy};
