//! Navigation Filter
//!
//! Derives the visible menu from the static definition and the current
//! access context. Recomputed on every render; the only state kept between
//! renders is which sections and groups the user has expanded.

use super::menu::{default_menu, MenuItem, MenuSection};
use crate::auth::{AccessContext, Role};
use lexdesk_core::{NavigationConfig, NavigationPolicy};
use std::collections::HashSet;
use tracing::trace;

/// Visibility of a single item; first matching rule wins
pub fn is_item_visible(item: &MenuItem, access: &AccessContext, policy: NavigationPolicy) -> bool {
    if item.always_visible {
        return true;
    }

    if item.requires_admin() {
        return access.can_administer();
    }

    match policy {
        NavigationPolicy::AllowByDefault => true,
        NavigationPolicy::DenyByDefault => item.module.map_or(true, |m| access.has_module(m)),
    }
}

fn filter_item(item: &MenuItem, access: &AccessContext, policy: NavigationPolicy) -> Option<MenuItem> {
    if !is_item_visible(item, access, policy) {
        trace!(item = item.key, "menu item hidden");
        return None;
    }

    let children = item
        .children
        .iter()
        .filter(|child| is_item_visible(child, access, policy))
        .cloned()
        .collect();

    Some(MenuItem {
        children,
        ..item.clone()
    })
}

/// Filter the whole menu; sections left without items are dropped
pub fn filter_menu(
    menu: &[MenuSection],
    access: &AccessContext,
    policy: NavigationPolicy,
) -> Vec<MenuSection> {
    menu.iter()
        .filter_map(|section| {
            let items: Vec<MenuItem> = section
                .items
                .iter()
                .filter_map(|item| filter_item(item, access, policy))
                .collect();

            if items.is_empty() {
                trace!(section = section.key, "menu section dropped");
                None
            } else {
                Some(MenuSection {
                    items,
                    ..section.clone()
                })
            }
        })
        .collect()
}

/// Menu definition bundled with the settings that drive filtering
#[derive(Debug, Clone)]
pub struct NavigationFilter {
    menu: Vec<MenuSection>,
    owner_role: Role,
    policy: NavigationPolicy,
}

impl Default for NavigationFilter {
    fn default() -> Self {
        Self::new(default_menu(), Role::owner(), NavigationPolicy::default())
    }
}

impl NavigationFilter {
    pub fn new(menu: Vec<MenuSection>, owner_role: Role, policy: NavigationPolicy) -> Self {
        Self {
            menu,
            owner_role,
            policy,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(
            default_menu(),
            Role::new(config.owner_role.clone()),
            config.policy,
        )
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn owner_role(&self) -> &Role {
        &self.owner_role
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    pub fn menu(&self) -> &[MenuSection] {
        &self.menu
    }

    /// Visible menu for the given access context
    pub fn visible(&self, access: &AccessContext) -> Vec<MenuSection> {
        filter_menu(&self.menu, access, self.policy)
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// True when the item, or one of its sub-items, points at `current_path`
pub fn is_active(item: &MenuItem, current_path: &str) -> bool {
    let current = strip_query(current_path);
    item.route.is_some_and(|route| strip_query(route) == current)
        || item.children.iter().any(|child| is_active(child, current_path))
}

/// Session-local expand/collapse toggles, keyed by section or item key.
/// Starts with everything collapsed and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    expanded: HashSet<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a toggle and return the new state
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        }
    }

    pub fn expand(&mut self, key: &str) {
        self.expanded.insert(key.to_string());
    }

    pub fn collapse(&mut self, key: &str) {
        self.expanded.remove(key);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Non-collapsible sections are always open
    pub fn is_section_open(&self, section: &MenuSection) -> bool {
        section
            .collapsible_key
            .map_or(true, |key| self.is_expanded(key))
    }

    /// Expand the section and group containing the active item
    pub fn reveal(&mut self, menu: &[MenuSection], current_path: &str) {
        for section in menu {
            for item in &section.items {
                if !is_active(item, current_path) {
                    continue;
                }
                if let Some(key) = section.collapsible_key {
                    self.expand(key);
                }
                if item.has_children() {
                    self.expand(item.key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Capability, PermissionSet, UserProfile};

    fn access(role: &str, permissions: PermissionSet) -> AccessContext {
        let user = UserProfile::new("u-1", "x@example.com", "X", "Y", role)
            .with_permissions(permissions);
        AccessContext::for_user(&user, Role::owner())
    }

    fn keys(menu: &[MenuSection]) -> Vec<&'static str> {
        menu.iter()
            .flat_map(|section| section.all_items().map(|item| item.key).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_always_visible_beats_admin_flag() {
        let item = MenuItem::link("profile", "Profile", "/profile", "user")
            .admin_only()
            .always_visible();
        let nobody = AccessContext::anonymous(Role::owner());
        assert!(is_item_visible(&item, &nobody, NavigationPolicy::DenyByDefault));
    }

    #[test]
    fn test_admin_items_need_settings_or_owner() {
        let menu = default_menu();

        let staff = access("STAFF", PermissionSet::none());
        let visible = filter_menu(&menu, &staff, NavigationPolicy::AllowByDefault);
        assert!(!keys(&visible).contains(&"users"));
        assert!(!keys(&visible).contains(&"system-settings"));
        assert!(visible.iter().all(|s| s.title != "System Administration"));

        let settings = access(
            "OFFICE_MANAGER",
            PermissionSet::from_grants([Capability::ManageSettings], Vec::<String>::new()),
        );
        let visible = filter_menu(&menu, &settings, NavigationPolicy::AllowByDefault);
        assert!(keys(&visible).contains(&"users"));
        assert!(keys(&visible).contains(&"audit-log"));

        let owner = access(Role::OWNER, PermissionSet::none());
        let visible = filter_menu(&menu, &owner, NavigationPolicy::AllowByDefault);
        assert_eq!(visible, menu);
    }

    #[test]
    fn test_sub_items_filtered_independently() {
        let menu = vec![MenuSection::new(
            "practice",
            "Practice",
            vec![MenuItem::link("cases", "Cases", "/cases", "f").with_children(vec![
                MenuItem::link("cases-all", "All", "/cases", "f"),
                MenuItem::link("cases-purge", "Purge", "/cases/purge", "f").admin_only(),
            ])],
        )];

        let staff = access("CLERK_SHARIA", PermissionSet::none());
        let visible = filter_menu(&menu, &staff, NavigationPolicy::AllowByDefault);
        assert_eq!(keys(&visible), vec!["cases", "cases-all"]);
    }

    #[test]
    fn test_empty_section_is_dropped() {
        let menu = vec![
            MenuSection::new(
                "admin",
                "Admin",
                vec![MenuItem::link("only", "Only", "/only", "x").admin_only()],
            ),
            MenuSection::new("home", "Home", vec![MenuItem::link("home", "Home", "/", "x")]),
        ];

        let staff = access("CLERK_SHARIA", PermissionSet::none());
        let visible = filter_menu(&menu, &staff, NavigationPolicy::AllowByDefault);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].key, "home");
    }

    #[test]
    fn test_deny_by_default_uses_modules() {
        let menu = default_menu();
        let clerk = access(
            "CLERK_COMMON_LAW",
            PermissionSet::from_grants(Vec::<Capability>::new(), ["cases"]),
        );

        let visible = filter_menu(&menu, &clerk, NavigationPolicy::DenyByDefault);
        let visible_keys = keys(&visible);
        assert!(visible_keys.contains(&"dashboard"));
        assert!(visible_keys.contains(&"cases"));
        assert!(visible_keys.contains(&"cases-archived"));
        assert!(!visible_keys.contains(&"clients"));
        assert!(!visible_keys.contains(&"invoices"));
        assert!(visible.iter().all(|s| s.key != "finance"));
        assert!(visible_keys.contains(&"profile"));

        let allowed = filter_menu(&menu, &clerk, NavigationPolicy::AllowByDefault);
        assert!(keys(&allowed).contains(&"invoices"));
    }

    #[test]
    fn test_navigation_filter_from_config() {
        let config = NavigationConfig {
            owner_role: "EQUITY_PARTNER_CO_OWNER".to_string(),
            ..NavigationConfig::default()
        };
        let filter = NavigationFilter::from_config(&config);
        assert_eq!(filter.owner_role().as_str(), "EQUITY_PARTNER_CO_OWNER");

        let partner = UserProfile::new("u", "p@example.com", "P", "Q", "EQUITY_PARTNER_CO_OWNER");
        let context = AccessContext::for_user(&partner, filter.owner_role().clone());
        assert_eq!(filter.visible(&context).len(), filter.menu().len());
    }

    #[test]
    fn test_is_active() {
        let menu = default_menu();
        let cases = menu[1].items.iter().find(|i| i.key == "cases").unwrap();
        assert!(is_active(cases, "/cases"));
        assert!(is_active(cases, "/cases?status=archived"));
        assert!(!is_active(cases, "/clients"));

        let system = menu[3].items.iter().find(|i| i.key == "system").unwrap();
        assert!(is_active(system, "/admin/audit"));
    }

    #[test]
    fn test_navigation_state_toggles() {
        let menu = default_menu();
        let mut state = NavigationState::new();

        assert!(state.is_section_open(&menu[0]));
        assert!(!state.is_section_open(&menu[1]));

        assert!(state.toggle("practice"));
        assert!(state.is_section_open(&menu[1]));
        assert!(!state.toggle("practice"));
        assert!(!state.is_expanded("practice"));

        state.reveal(&menu, "/admin/settings");
        assert!(state.is_expanded("administration"));
        assert!(state.is_expanded("system"));

        state.collapse_all();
        assert_eq!(state, NavigationState::new());
    }
}
