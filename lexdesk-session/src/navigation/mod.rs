//! Navigation Module
//!
//! Static menu definition and the per-user filter over it.

pub mod filter;
pub mod menu;

pub use filter::{filter_menu, is_active, is_item_visible, NavigationFilter, NavigationState};
pub use menu::{default_menu, is_admin_module, MenuItem, MenuSection, ADMIN_MODULES};
