//! Login, logout and profile flows
//!
//! Glue between the auth service and the session store. Flows never panic and
//! never leave the session half-updated: the store is touched only after the
//! server call it depends on has succeeded.

use crate::service::AuthService;
use lexdesk_core::{ErrorContext, LexError, LexResult};
use lexdesk_session::{SessionContext, UserProfile};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Minimum password length accepted by the login and password forms
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
        .is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message shown to the user after a flow completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Credentials as typed into the login form
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Field checks run before anything is sent
    pub fn validate(&self) -> LexResult<()> {
        if !is_valid_email(self.email.trim()) {
            return Err(lexdesk_core::validation_error!(
                "Invalid email address",
                "email",
                "login_form"
            ));
        }
        validate_password(&self.password, "password")
    }
}

fn validate_password(password: &str, field: &str) -> LexResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(lexdesk_core::validation_error!(
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            field,
            "login_form"
        ));
    }
    Ok(())
}

fn failure_message(error: &LexError, fallback: &str) -> String {
    let message = error.user_message();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Authentication flows bound to one session
#[derive(Clone)]
pub struct AuthFlow {
    service: Arc<dyn AuthService>,
    session: SessionContext,
}

impl AuthFlow {
    pub fn new(service: Arc<dyn AuthService>, session: SessionContext) -> Self {
        Self { service, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Validate, exchange credentials and start the session.
    ///
    /// On any failure the session is left exactly as it was.
    pub async fn login(&self, form: &LoginForm) -> Notification {
        if let Err(e) = form.validate() {
            return Notification::error(e.user_message());
        }

        match self.service.login(form.email.trim(), &form.password).await {
            Ok(outcome) => {
                self.session.login(outcome.user, outcome.token).await;
                Notification::success("Login successful!")
            }
            Err(e) => {
                e.log();
                Notification::error(failure_message(&e, "Login failed"))
            }
        }
    }

    /// End the session. The server is told first when there is a token, but
    /// its answer does not matter: the local session is always cleared.
    pub async fn logout(&self) -> Notification {
        if self.session.token().await.is_some() {
            if let Err(e) = self.service.logout().await {
                warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }

        self.session.logout().await;
        Notification::success("Logged out")
    }

    /// Re-fetch the profile and replace the session copy with it.
    ///
    /// Role and permissions stay as they were at login.
    pub async fn refresh_profile(&self) -> LexResult<UserProfile> {
        if !self.session.is_authenticated().await {
            return Err(LexError::Authentication {
                message: "Not logged in".to_string(),
                status: None,
                context: ErrorContext::new("auth_flow")
                    .with_operation("refresh_profile")
                    .with_suggestion("Run 'lexdesk login' first"),
            });
        }

        let fetched = self.service.get_current_user().await?;
        self.session.refresh_user(fetched).await;

        let session = self.session.read().await;
        session.user().cloned().ok_or_else(|| LexError::Internal {
            message: "Session was cleared during profile refresh".to_string(),
            source: None,
            context: ErrorContext::new("auth_flow").with_operation("refresh_profile"),
        })
    }

    /// Validate the new password and forward the change to the server
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> LexResult<()> {
        validate_password(new_password, "newPassword")?;

        self.service
            .change_password(current_password, new_password)
            .await?;
        info!("Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::LoginOutcome;
    use lexdesk_session::{
        Capability, MemorySessionStorage, PermissionSet, Role, SessionSnapshot, SessionStore,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted service recording how often it was called
    #[derive(Default)]
    struct MockAuthService {
        login_result: Mutex<Option<LexResult<LoginOutcome>>>,
        current_user: Mutex<Option<UserProfile>>,
        fail_logout: bool,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AuthService for MockAuthService {
        async fn login(&self, _email: &str, _password: &str) -> LexResult<LoginOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.login_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(lexdesk_core::auth_error!("", "mock")))
        }

        async fn get_current_user(&self) -> LexResult<UserProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.current_user
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| lexdesk_core::auth_error!("Unauthorized", "mock", 401))
        }

        async fn change_password(&self, _current: &str, _new: &str) -> LexResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn logout(&self) -> LexResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_logout {
                Err(lexdesk_core::auth_error!("gone", "mock"))
            } else {
                Ok(())
            }
        }
    }

    fn user() -> UserProfile {
        UserProfile::new("u-1", "amina@example.com", "Amina", "Kato", "CLERK_SHARIA")
            .with_permissions(PermissionSet::from_grants([Capability::ManageCases], ["cases"]))
    }

    fn flow(service: MockAuthService) -> (Arc<MockAuthService>, AuthFlow) {
        let service = Arc::new(service);
        let store = SessionStore::rehydrate(Arc::new(MemorySessionStorage::new()), "auth-storage");
        let flow = AuthFlow::new(service.clone(), SessionContext::new(store));
        (service, flow)
    }

    #[test]
    fn test_form_validation() {
        assert!(LoginForm::new("amina@example.com", "secret1").validate().is_ok());

        let err = LoginForm::new("not-an-email", "secret1").validate().unwrap_err();
        assert_eq!(err.user_message(), "Invalid email address");

        let err = LoginForm::new("amina@example.com", "12345").validate().unwrap_err();
        assert_eq!(err.user_message(), "Password must be at least 6 characters");
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@c.d"));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_server() {
        let (service, flow) = flow(MockAuthService::default());

        let note = flow.login(&LoginForm::new("bad", "secret1")).await;
        assert!(!note.is_success());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(!flow.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_successful_login_starts_session() {
        let (_, flow) = flow(MockAuthService {
            login_result: Mutex::new(Some(Ok(LoginOutcome {
                user: user(),
                token: "token-1".into(),
            }))),
            ..MockAuthService::default()
        });

        let note = flow.login(&LoginForm::new(" amina@example.com ", "secret1")).await;
        assert_eq!(note, Notification::success("Login successful!"));
        assert!(flow.session().is_authenticated().await);
        assert_eq!(flow.session().token().await.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let (_, flow) = flow(MockAuthService {
            login_result: Mutex::new(Some(Err(lexdesk_core::auth_error!(
                "Invalid credentials",
                "mock",
                401
            )))),
            ..MockAuthService::default()
        });

        let note = flow.login(&LoginForm::new("amina@example.com", "secret1")).await;
        assert_eq!(note, Notification::error("Invalid credentials"));
        assert_eq!(flow.session().snapshot().await, SessionSnapshot::logged_out());
    }

    #[tokio::test]
    async fn test_empty_error_falls_back_to_login_failed() {
        let (_, flow) = flow(MockAuthService::default());
        let note = flow.login(&LoginForm::new("amina@example.com", "secret1")).await;
        assert_eq!(note, Notification::error("Login failed"));
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_server_fails() {
        let (service, flow) = flow(MockAuthService {
            fail_logout: true,
            ..MockAuthService::default()
        });
        flow.session().login(user(), "token-1").await;

        let note = flow.logout().await;
        assert!(note.is_success());
        assert!(!flow.session().is_authenticated().await);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        // Already logged out: no server call
        flow.logout().await;
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_profile_keeps_permissions() {
        let server_copy = UserProfile::new("u-1", "amina@example.com", "Amina", "Kato-Ssali", "CLERK_SHARIA")
            .with_position("Senior Clerk");
        let (_, flow) = flow(MockAuthService {
            current_user: Mutex::new(Some(server_copy)),
            ..MockAuthService::default()
        });
        flow.session().login(user(), "token-1").await;

        let refreshed = flow.refresh_profile().await.unwrap();
        assert_eq!(refreshed.last_name, "Kato-Ssali");
        assert_eq!(refreshed.position.as_deref(), Some("Senior Clerk"));
        assert!(refreshed.permissions.grants(Capability::ManageCases));
    }

    #[tokio::test]
    async fn test_refresh_profile_cannot_change_role() {
        let promoted = UserProfile::new("u-1", "amina@example.com", "Amina", "Kato", Role::OWNER);
        let (_, flow) = flow(MockAuthService {
            current_user: Mutex::new(Some(promoted)),
            ..MockAuthService::default()
        });
        flow.session().login(user(), "token-1").await;
        assert!(!flow.session().access_context(Role::owner()).await.can_administer());

        let refreshed = flow.refresh_profile().await.unwrap();
        assert_eq!(refreshed.role.as_str(), "CLERK_SHARIA");
        assert!(!flow.session().access_context(Role::owner()).await.can_administer());
    }

    #[tokio::test]
    async fn test_refresh_profile_clears_dropped_fields() {
        let (_, flow) = flow(MockAuthService {
            current_user: Mutex::new(Some(user())),
            ..MockAuthService::default()
        });
        let mut signed_in = user().with_position("Court Clerk");
        signed_in.phone = Some("+256 700 000000".to_string());
        flow.session().login(signed_in, "token-1").await;

        let refreshed = flow.refresh_profile().await.unwrap();
        assert!(refreshed.phone.is_none());
        assert!(refreshed.position.is_none());
        assert_eq!(flow.session().read().await.user(), Some(&refreshed));
    }

    #[tokio::test]
    async fn test_refresh_profile_requires_session() {
        let (service, flow) = flow(MockAuthService::default());
        let err = flow.refresh_profile().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_refresh_does_not_log_out() {
        let (_, flow) = flow(MockAuthService::default());
        flow.session().login(user(), "stale-token").await;

        let err = flow.refresh_profile().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(flow.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_change_password_checks_length() {
        let (service, flow) = flow(MockAuthService::default());

        let err = flow.change_password("old-secret", "short").await.unwrap_err();
        assert!(matches!(err, LexError::Validation { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        flow.change_password("old-secret", "long-enough").await.unwrap();
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}
