//! Integration tests for lexdesk-core infrastructure

use lexdesk_core::{
    auth_error, config_error, init_logging, validation_error, ErrorContext, LexConfig, LexError,
    LogFormat, LoggingConfig, API_URL_ENV,
};

#[test]
fn test_error_handling() {
    let error = config_error!("Invalid config", "test_component");

    match &error {
        LexError::Config {
            message, context, ..
        } => {
            assert_eq!(message, "Invalid config");
            assert_eq!(context.component, "test_component");
            assert_eq!(context.recovery_suggestions.len(), 2);
        }
        _ => panic!("Expected Config error"),
    }

    // Should not panic
    error.log();
    assert!(!error.is_recoverable());

    let network_error = LexError::Network {
        message: "Connection failed".to_string(),
        status: None,
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());
    assert!(!network_error.is_unauthorized());

    let auth = auth_error!("Invalid credentials", "test");
    assert!(auth.is_unauthorized());

    let validation = validation_error!("Password must be at least 6 characters", "password", "test");
    assert_eq!(
        validation.user_message(),
        "Password must be at least 6 characters"
    );
}

#[test]
fn test_io_and_serde_conversions() {
    fn parse(raw: &str) -> Result<serde_json::Value, LexError> {
        Ok(serde_json::from_str(raw)?)
    }

    let err = parse("{not json").unwrap_err();
    assert!(matches!(err, LexError::Serialization(_)));
    assert!(err.context().is_none());

    let io: LexError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, LexError::Io(_)));
}

#[test]
fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        include_location: false,
        include_thread: false,
        log_to_file: false,
        log_file_path: None,
        filter_directives: vec!["lexdesk_core=debug".to_string()],
    };

    // A global subscriber can only be installed once per process, so the
    // second call must report an error instead of panicking.
    let first = init_logging(&config);
    let second = init_logging(&config);
    assert!(first.is_ok() || second.is_err());
    assert!(second.is_err());
}

#[test]
fn test_env_override() {
    let mut config = LexConfig::default();

    std::env::set_var(API_URL_ENV, "https://firm.example.com/api");
    config.apply_env_overrides();
    std::env::remove_var(API_URL_ENV);

    assert_eq!(config.api.base_url, "https://firm.example.com/api");
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = LexConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.storage.storage_key, "auth-storage");
}
