//! Authentication service
//!
//! The four calls the client makes against the auth backend. The trait is
//! the seam screens and flows depend on; [`HttpAuthService`] is the real
//! implementation.

use crate::api::{ApiClient, ApiEnvelope};
use async_trait::async_trait;
use lexdesk_core::{LexConfig, LexResult};
use lexdesk_session::{PermissionSet, SessionContext, UserProfile};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a successful credential exchange
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub token: String,
}

/// Operations against the authentication backend
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a user and bearer token
    async fn login(&self, email: &str, password: &str) -> LexResult<LoginOutcome>;

    /// Fetch the profile the current token belongs to
    async fn get_current_user(&self) -> LexResult<UserProfile>;

    async fn change_password(&self, current_password: &str, new_password: &str) -> LexResult<()>;

    /// Tell the server the token is no longer in use
    async fn logout(&self) -> LexResult<()>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// `data` of the login and current-user responses
#[derive(Debug, Deserialize)]
struct UserPayload {
    user: UserProfile,
    #[serde(default)]
    token: Option<String>,
    /// Some deployments return permissions beside the user instead of inside it
    #[serde(default)]
    permissions: Option<PermissionSet>,
}

impl UserPayload {
    fn into_user(self) -> UserProfile {
        match self.permissions {
            Some(permissions) => self.user.with_permissions(permissions),
            None => self.user,
        }
    }
}

/// [`AuthService`] over the JSON HTTP API
#[derive(Clone)]
pub struct HttpAuthService {
    api: ApiClient,
}

impl HttpAuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Build from configuration, reading the bearer token from `session`
    pub fn from_config(config: &LexConfig, session: SessionContext) -> LexResult<Self> {
        let api = ApiClient::new(&config.api, Some(session))?;
        info!("Auth service targeting {}", api.base_url());
        Ok(Self::new(api))
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, email: &str, password: &str) -> LexResult<LoginOutcome> {
        debug!("Logging in as {}", email);

        let envelope: ApiEnvelope<UserPayload> = self
            .api
            .post("/auth/login", &LoginRequest { email, password })
            .await?;
        let payload = envelope.into_data("Login failed", "login")?;

        let token = payload.token.clone().filter(|t| !t.is_empty()).ok_or_else(|| {
            lexdesk_core::auth_error!("Login response did not include a token", "auth_service")
        })?;

        Ok(LoginOutcome {
            user: payload.into_user(),
            token,
        })
    }

    async fn get_current_user(&self) -> LexResult<UserProfile> {
        let envelope: ApiEnvelope<UserPayload> = self.api.get("/auth/me").await?;
        let payload = envelope.into_data("Failed to get current user", "get_current_user")?;
        Ok(payload.into_user())
    }

    async fn change_password(&self, current_password: &str, new_password: &str) -> LexResult<()> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .api
            .put(
                "/auth/change-password",
                &ChangePasswordRequest {
                    current_password,
                    new_password,
                },
            )
            .await?;
        envelope.into_ack("Failed to change password", "change_password")
    }

    async fn logout(&self) -> LexResult<()> {
        // Body is ignored; any 2xx counts
        self.api
            .send::<()>(Method::POST, "/auth/logout", None)
            .await?;
        Ok(())
    }
}
