//! Menu Definition
//!
//! The compiled-in navigation tree. It is filtered per user, never edited.

use serde::Serialize;

/// Modules whose items belong to the administration area
pub const ADMIN_MODULES: [&str; 3] = ["administration", "user-management", "system-settings"];

pub fn is_admin_module(module: &str) -> bool {
    ADMIN_MODULES.iter().any(|admin| *admin == module)
}

/// A top-level menu section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub key: &'static str,
    pub title: &'static str,
    /// Set when the section can be collapsed; keys the expand toggle
    pub collapsible_key: Option<&'static str>,
    pub items: Vec<MenuItem>,
}

/// A menu entry; `children` holds sub-items one level deep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub route: Option<&'static str>,
    pub icon: &'static str,
    pub module: Option<&'static str>,
    pub admin_only: bool,
    pub always_visible: bool,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn link(key: &'static str, label: &'static str, route: &'static str, icon: &'static str) -> Self {
        Self {
            key,
            label,
            route: Some(route),
            icon,
            module: None,
            admin_only: false,
            always_visible: false,
            children: Vec::new(),
        }
    }

    /// Entry without a route of its own, grouping sub-items
    pub fn group(key: &'static str, label: &'static str, icon: &'static str) -> Self {
        Self {
            route: None,
            ..Self::link(key, label, "/", icon)
        }
    }

    pub fn module(mut self, module: &'static str) -> Self {
        self.module = Some(module);
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    /// Attach sub-items; their own children are dropped
    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children
            .into_iter()
            .map(|mut child| {
                child.children.clear();
                child
            })
            .collect();
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Admin-only flag or membership of an admin module
    pub fn requires_admin(&self) -> bool {
        self.admin_only || self.module.is_some_and(is_admin_module)
    }
}

impl MenuSection {
    pub fn new(key: &'static str, title: &'static str, items: Vec<MenuItem>) -> Self {
        Self {
            key,
            title,
            collapsible_key: None,
            items,
        }
    }

    pub fn collapsible(mut self, key: &'static str) -> Self {
        self.collapsible_key = Some(key);
        self
    }

    /// All items including sub-items, depth-first
    pub fn all_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.items
            .iter()
            .flat_map(|item| std::iter::once(item).chain(item.children.iter()))
    }
}

/// The application menu
pub fn default_menu() -> Vec<MenuSection> {
    vec![
        MenuSection::new(
            "overview",
            "Overview",
            vec![MenuItem::link("dashboard", "Dashboard", "/dashboard", "layout-dashboard")],
        ),
        MenuSection::new(
            "practice",
            "Practice",
            vec![
                MenuItem::link("clients", "Clients", "/clients", "users").module("clients"),
                MenuItem::link("cases", "Cases", "/cases", "file-text")
                    .module("cases")
                    .with_children(vec![
                        MenuItem::link("cases-all", "All Cases", "/cases", "file-text")
                            .module("cases"),
                        MenuItem::link("cases-archived", "Archived Cases", "/cases?status=archived", "archive")
                            .module("cases"),
                    ]),
                MenuItem::link("documents", "Documents", "/documents", "folder-open")
                    .module("documents"),
            ],
        )
        .collapsible("practice"),
        MenuSection::new(
            "finance",
            "Finance",
            vec![
                MenuItem::link("invoices", "Invoices", "/invoices", "receipt").module("invoices"),
                MenuItem::link("reports", "Financial Reports", "/reports", "bar-chart")
                    .module("finance"),
            ],
        )
        .collapsible("finance"),
        MenuSection::new(
            "administration",
            "System Administration",
            vec![
                MenuItem::link("users", "User Management", "/users", "user-cog")
                    .module("user-management"),
                MenuItem::group("system", "System", "server")
                    .module("administration")
                    .with_children(vec![
                        MenuItem::link("system-settings", "System Settings", "/admin/settings", "sliders")
                            .admin_only(),
                        MenuItem::link("audit-log", "Audit Log", "/admin/audit", "scroll-text")
                            .admin_only(),
                    ]),
            ],
        )
        .collapsible("administration"),
        MenuSection::new(
            "account",
            "Account",
            vec![
                MenuItem::link("profile", "Profile", "/profile", "user").always_visible(),
                MenuItem::link("settings", "Settings", "/settings", "settings").always_visible(),
            ],
        ),
    ]
}
