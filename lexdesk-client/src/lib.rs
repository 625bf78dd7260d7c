//! LexDesk Client - talks to the practice backend on behalf of the session
//!
//! - `api`: reqwest client, response envelope and error mapping
//! - `service`: the [`AuthService`] seam and its HTTP implementation
//! - `flow`: login/logout/profile flows that update the session

pub mod api;
pub mod flow;
pub mod service;

pub use api::{ApiClient, ApiEnvelope};
pub use flow::{AuthFlow, LoginForm, Notification, NotificationKind, MIN_PASSWORD_LEN};
pub use service::{AuthService, HttpAuthService, LoginOutcome};
