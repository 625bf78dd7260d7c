//! Session Types
//!
//! The persisted session triple and the envelope it is stored in.

use crate::auth::UserProfile;
use serde::{Deserialize, Serialize};

/// Version written into every persisted envelope
pub const STORAGE_VERSION: u32 = 0;

/// The persisted `{user, token, isAuthenticated}` triple
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl SessionSnapshot {
    /// Build a snapshot; the flag is derived from `user` and `token`
    pub fn new(user: Option<UserProfile>, token: Option<String>) -> Self {
        let is_authenticated = user.is_some() && token.is_some();
        Self {
            user,
            token,
            is_authenticated,
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    /// Recompute the flag, discarding whatever value was stored
    pub fn normalized(self) -> Self {
        Self::new(self.user, self.token)
    }
}

/// On-disk layout: `{"state": {...}, "version": 0}`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistedEnvelope {
    pub state: SessionSnapshot,
    #[serde(default)]
    pub version: u32,
}

impl PersistedEnvelope {
    pub fn new(state: SessionSnapshot) -> Self {
        Self {
            state,
            version: STORAGE_VERSION,
        }
    }
}
