//! Route Guard
//!
//! Access decision for the protected region of the application, plus the
//! catalogue of views that live inside it.

use lexdesk_core::NavigationConfig;
use serde::{Deserialize, Serialize};

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardDecision {
    /// Render the requested view
    Allow,
    /// Session is not authenticated
    RedirectToLogin,
    /// Already logged in and asking for the login view
    RedirectToDefault,
}

impl std::fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardDecision::Allow => write!(f, "allow"),
            GuardDecision::RedirectToLogin => write!(f, "redirect-to-login"),
            GuardDecision::RedirectToDefault => write!(f, "redirect-to-default"),
        }
    }
}

/// Pure access decision: no I/O, no suspension points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    default_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new("/login", "/dashboard")
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>, default_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            default_path: default_path.into(),
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.login_path.clone(), config.default_path.clone())
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    pub fn is_login_path(&self, path: &str) -> bool {
        normalize_path(path) == normalize_path(&self.login_path)
    }

    /// Decide what to do with a request for `path`
    pub fn check(&self, authenticated: bool, path: &str) -> GuardDecision {
        match (authenticated, self.is_login_path(path)) {
            (true, true) => GuardDecision::RedirectToDefault,
            (true, false) => GuardDecision::Allow,
            (false, true) => GuardDecision::Allow,
            (false, false) => GuardDecision::RedirectToLogin,
        }
    }

    /// Path to render after applying the decision
    pub fn target<'a>(&'a self, authenticated: bool, path: &'a str) -> &'a str {
        match self.check(authenticated, path) {
            GuardDecision::Allow => path,
            GuardDecision::RedirectToLogin => &self.login_path,
            GuardDecision::RedirectToDefault => &self.default_path,
        }
    }
}

/// Strip query string, fragment and trailing slashes
fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Views inside the protected region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Dashboard,
    Clients,
    Cases,
    Documents,
    Invoices,
    Users,
    Profile,
    Settings,
}

impl AppRoute {
    pub const ALL: [AppRoute; 8] = [
        AppRoute::Dashboard,
        AppRoute::Clients,
        AppRoute::Cases,
        AppRoute::Documents,
        AppRoute::Invoices,
        AppRoute::Users,
        AppRoute::Profile,
        AppRoute::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Dashboard => "/dashboard",
            AppRoute::Clients => "/clients",
            AppRoute::Cases => "/cases",
            AppRoute::Documents => "/documents",
            AppRoute::Invoices => "/invoices",
            AppRoute::Users => "/users",
            AppRoute::Profile => "/profile",
            AppRoute::Settings => "/settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppRoute::Dashboard => "Dashboard",
            AppRoute::Clients => "Clients",
            AppRoute::Cases => "Cases",
            AppRoute::Documents => "Documents",
            AppRoute::Invoices => "Invoices",
            AppRoute::Users => "User Management",
            AppRoute::Profile => "Profile",
            AppRoute::Settings => "Settings",
        }
    }

    /// Resolve a path to a view; `/` is the dashboard, unknown paths are `None`
    pub fn resolve(path: &str) -> Option<AppRoute> {
        let path = normalize_path(path);
        if path == "/" {
            return Some(AppRoute::Dashboard);
        }
        Self::ALL.into_iter().find(|route| route.path() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTECTED: [&str; 6] = ["/", "/dashboard", "/cases", "/users", "/profile", "/nowhere"];

    #[test]
    fn test_unauthenticated_is_sent_to_login() {
        let guard = RouteGuard::default();
        for path in PROTECTED {
            assert_eq!(guard.check(false, path), GuardDecision::RedirectToLogin, "{}", path);
        }
        assert_eq!(guard.check(false, "/login"), GuardDecision::Allow);
    }

    #[test]
    fn test_authenticated_login_redirects_to_default() {
        let guard = RouteGuard::default();
        assert_eq!(guard.check(true, "/login"), GuardDecision::RedirectToDefault);
        assert_eq!(guard.check(true, "/login/"), GuardDecision::RedirectToDefault);
        assert_eq!(
            guard.check(true, "/login?next=/cases"),
            GuardDecision::RedirectToDefault
        );
        assert_eq!(guard.target(true, "/login"), "/dashboard");
    }

    #[test]
    fn test_authenticated_non_login_is_allowed() {
        let guard = RouteGuard::default();
        for path in PROTECTED {
            assert_eq!(guard.check(true, path), GuardDecision::Allow, "{}", path);
        }
        assert_eq!(guard.check(true, "/login-help"), GuardDecision::Allow);
        assert_eq!(guard.target(true, "/cases"), "/cases");
        assert_eq!(guard.target(false, "/cases"), "/login");
    }

    #[test]
    fn test_guard_from_config() {
        let config = NavigationConfig {
            login_path: "/signin".to_string(),
            default_path: "/home".to_string(),
            ..NavigationConfig::default()
        };
        let guard = RouteGuard::from_config(&config);
        assert_eq!(guard.check(true, "/signin"), GuardDecision::RedirectToDefault);
        assert_eq!(guard.check(true, "/login"), GuardDecision::Allow);
        assert_eq!(guard.default_path(), "/home");
    }

    #[test]
    fn test_resolve_routes() {
        assert_eq!(AppRoute::resolve("/"), Some(AppRoute::Dashboard));
        assert_eq!(AppRoute::resolve("/cases/"), Some(AppRoute::Cases));
        assert_eq!(AppRoute::resolve("/invoices?page=2"), Some(AppRoute::Invoices));
        assert_eq!(AppRoute::resolve("/reports"), None);
        for route in AppRoute::ALL {
            assert_eq!(AppRoute::resolve(route.path()), Some(route));
        }
    }
}
