//! Session Store
//!
//! Single source of truth for the current identity and bearer token.
//! Mutations are synchronous, never fail and persist immediately; a failed
//! write is logged and otherwise ignored.

use super::storage::{FileSessionStorage, SessionStorage};
use super::types::{PersistedEnvelope, SessionSnapshot, STORAGE_VERSION};
use crate::auth::{AccessContext, Role, UserProfile, UserUpdate};
use lexdesk_core::{LexConfig, LexResult};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Live session state bound to a storage entry
pub struct SessionStore {
    user: Option<UserProfile>,
    token: Option<String>,
    storage: Arc<dyn SessionStorage>,
    storage_key: String,
}

impl SessionStore {
    /// Restore the persisted session, or start logged out.
    ///
    /// A missing entry, an unreadable backend, malformed JSON or an unknown
    /// envelope version all yield the logged-out state.
    pub fn rehydrate(storage: Arc<dyn SessionStorage>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let snapshot = Self::read_snapshot(storage.as_ref(), &storage_key);

        if snapshot.is_authenticated {
            info!(
                "Restored session for {}",
                snapshot.user.as_ref().map(|u| u.email.as_str()).unwrap_or("?")
            );
        }

        Self {
            user: snapshot.user,
            token: snapshot.token,
            storage,
            storage_key,
        }
    }

    /// Open the file-backed store described by the configuration
    pub fn open(config: &LexConfig) -> LexResult<Self> {
        let storage = FileSessionStorage::new(config.data_dir())?;
        Ok(Self::rehydrate(
            Arc::new(storage),
            config.storage.storage_key.clone(),
        ))
    }

    fn read_snapshot(storage: &dyn SessionStorage, key: &str) -> SessionSnapshot {
        let raw = match storage.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted session under '{}'", key);
                return SessionSnapshot::logged_out();
            }
            Err(e) => {
                warn!("Failed to read persisted session '{}': {}", key, e);
                return SessionSnapshot::logged_out();
            }
        };

        match serde_json::from_str::<PersistedEnvelope>(&raw) {
            Ok(envelope) if envelope.version == STORAGE_VERSION => envelope.state.normalized(),
            Ok(envelope) => {
                warn!(
                    "Ignoring persisted session with unsupported version {}",
                    envelope.version
                );
                SessionSnapshot::logged_out()
            }
            Err(e) => {
                warn!("Discarding malformed persisted session '{}': {}", key, e);
                SessionSnapshot::logged_out()
            }
        }
    }

    fn persist(&self) {
        let envelope = PersistedEnvelope::new(self.snapshot());

        let result = serde_json::to_string(&envelope)
            .map_err(Into::into)
            .and_then(|json| self.storage.save(&self.storage_key, &json));

        match result {
            Ok(()) => debug!("Persisted session under '{}'", self.storage_key),
            Err(e) => warn!(
                "Failed to persist session to {}: {}",
                self.storage.describe(),
                e
            ),
        }
    }

    /// Replace the session with the given identity and token
    pub fn login(&mut self, user: UserProfile, token: impl Into<String>) {
        info!("Session started for {} ({})", user.email, user.role);
        self.user = Some(user);
        self.token = Some(token.into());
        self.persist();
    }

    /// Clear the session. Safe to call when already logged out.
    pub fn logout(&mut self) {
        if self.is_authenticated() {
            info!("Session ended");
        }
        self.user = None;
        self.token = None;
        self.persist();
    }

    /// Merge fields into the current user; returns false (and does nothing)
    /// when nobody is logged in
    pub fn update_user(&mut self, update: UserUpdate) -> bool {
        let Some(user) = self.user.as_mut() else {
            debug!("update_user ignored: no user in session");
            return false;
        };

        update.apply_to(user);
        self.persist();
        true
    }

    /// Replace the profile with a server copy, keeping `id`, `role` and `permissions`
    pub fn refresh_user(&mut self, fetched: UserProfile) -> bool {
        let Some(user) = self.user.as_mut() else {
            debug!("refresh_user ignored: no user in session");
            return false;
        };

        user.refresh_from(fetched);
        self.persist();
        true
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Always exactly `user.is_some() && token.is_some()`
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// The `{user, token, isAuthenticated}` triple
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.user.clone(), self.token.clone())
    }

    /// Access view for routing and navigation decisions
    pub fn access_context(&self, owner_role: Role) -> AccessContext {
        AccessContext::from_user(self.user.as_ref(), owner_role)
    }

    pub fn display_name(&self) -> Option<String> {
        self.user.as_ref().map(UserProfile::full_name)
    }

    pub fn initials(&self) -> Option<String> {
        self.user.as_ref().map(UserProfile::initials)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

/// Shared handle to the session, passed explicitly to whatever needs it.
///
/// Writers are not sequenced: two overlapping logins resolve last-writer-wins.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionStore>>,
}

impl SessionContext {
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, SessionStore> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, SessionStore> {
        self.inner.write().await
    }

    pub async fn login(&self, user: UserProfile, token: impl Into<String>) {
        self.inner.write().await.login(user, token);
    }

    pub async fn logout(&self) {
        self.inner.write().await.logout();
    }

    pub async fn update_user(&self, update: UserUpdate) -> bool {
        self.inner.write().await.update_user(update)
    }

    pub async fn refresh_user(&self, fetched: UserProfile) -> bool {
        self.inner.write().await.refresh_user(fetched)
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token().map(str::to_string)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().await.snapshot()
    }

    pub async fn access_context(&self, owner_role: Role) -> AccessContext {
        self.inner.read().await.access_context(owner_role)
    }
}
