//! Unified error handling system
//!
//! Structured error types carrying context and recovery suggestions. Screens
//! display these errors; nothing in the session layer rethrows them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type LexResult<T> = Result<T, LexError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the LexDesk client
#[derive(Error, Debug)]
pub enum LexError {
    /// Bad credentials, rejected or expired token
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl LexError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            LexError::Authentication { context, .. } => Some(context),
            LexError::Network { context, .. } => Some(context),
            LexError::Storage { context, .. } => Some(context),
            LexError::Config { context, .. } => Some(context),
            LexError::Validation { context, .. } => Some(context),
            LexError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Message suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            LexError::Authentication { message, .. }
            | LexError::Network { message, .. }
            | LexError::Storage { message, .. }
            | LexError::Config { message, .. }
            | LexError::Validation { message, .. }
            | LexError::Internal { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status attached to the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            LexError::Authentication { status, .. } | LexError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// True when a protected screen should treat the session as not authenticated
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LexError::Authentication { .. })
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LexError::Network { status, .. } => status.map_or(true, |s| s >= 500),
            LexError::Storage { .. } => true,
            LexError::Authentication { .. } => false,
            LexError::Config { .. } => false,
            LexError::Validation { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            LexError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            LexError::Config { .. } | LexError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            LexError::Network { .. } | LexError::Storage { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Network or storage error (may be recoverable)"
                );
            }
            LexError::Authentication { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Authentication rejected"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! auth_error {
    ($msg:expr, $component:expr) => {
        $crate::LexError::Authentication {
            message: $msg.to_string(),
            status: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your email and password"),
        }
    };
    ($msg:expr, $component:expr, $status:expr) => {
        $crate::LexError::Authentication {
            message: $msg.to_string(),
            status: Some($status),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Sign in again to obtain a fresh token"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::LexError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'lexdesk config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::LexError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_macro() {
        let error = auth_error!("Invalid credentials", "auth_service");

        match &error {
            LexError::Authentication {
                message,
                status,
                context,
            } => {
                assert_eq!(message, "Invalid credentials");
                assert_eq!(*status, None);
                assert_eq!(context.component, "auth_service");
                assert!(!context.error_id.is_empty());
            }
            _ => panic!("Expected Authentication error"),
        }

        assert!(error.is_unauthorized());
        assert!(!error.is_recoverable());
        assert_eq!(error.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_auth_error_with_status() {
        let error = auth_error!("Token expired", "auth_service", 401);
        assert_eq!(error.status(), Some(401));
        assert!(error.is_unauthorized());
    }

    #[test]
    fn test_network_recoverability() {
        let server_error = LexError::Network {
            message: "HTTP error! status: 503".to_string(),
            status: Some(503),
            source: None,
            context: ErrorContext::new("test"),
        };
        assert!(server_error.is_recoverable());

        let client_error = LexError::Network {
            message: "HTTP error! status: 404".to_string(),
            status: Some(404),
            source: None,
            context: ErrorContext::new("test"),
        };
        assert!(!client_error.is_recoverable());

        let offline = LexError::Network {
            message: "connection refused".to_string(),
            status: None,
            source: None,
            context: ErrorContext::new("test"),
        };
        assert!(offline.is_recoverable());
    }

    #[test]
    fn test_validation_error_macro() {
        let error = validation_error!("Invalid email address", "email", "login_form");
        match &error {
            LexError::Validation { field, context, .. } => {
                assert_eq!(field.as_deref(), Some("email"));
                assert_eq!(context.recovery_suggestions.len(), 1);
            }
            _ => panic!("Expected Validation error"),
        }
        assert_eq!(error.to_string(), "Validation error: Invalid email address");
        error.log();
    }

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("session_store")
            .with_operation("persist")
            .with_metadata("key", "auth-storage")
            .with_suggestion("Check disk space");

        assert_eq!(context.operation.as_deref(), Some("persist"));
        assert_eq!(
            context.metadata.get("key").map(String::as_str),
            Some("auth-storage")
        );
        assert_eq!(context.recovery_suggestions, vec!["Check disk space"]);
    }
}
