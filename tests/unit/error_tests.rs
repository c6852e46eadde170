//! Unit tests for error display formats and conversions.

use bead_intercom::api::BackendError;
use bead_intercom::AppError;

#[test]
fn display_uses_kind_prefix() {
    let cases = [
        (AppError::Config("bad".into()), "config: bad"),
        (AppError::Slack("bad".into()), "slack: bad"),
        (AppError::Api("bad".into()), "api: bad"),
        (AppError::Http("bad".into()), "http: bad"),
        (AppError::Io("bad".into()), "io: bad"),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn error_messages_have_no_trailing_period() {
    let err = AppError::Config("read failed".into());
    assert!(!err.to_string().ends_with('.'));
}

#[test]
fn toml_errors_become_config_errors() {
    let toml_err = toml::from_str::<toml::Value>("a = [").unwrap_err();
    let err: AppError = toml_err.into();
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn io_errors_become_io_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: AppError = io.into();
    assert!(matches!(err, AppError::Io(ref msg) if msg == "gone"));
}

#[test]
fn backend_error_display_includes_status() {
    let err = BackendError::new(404, "not found");
    assert_eq!(err.to_string(), "not found (404)");
}

#[test]
fn transport_errors_have_status_zero() {
    let err = BackendError::transport("connection refused");
    assert_eq!(err.status, 0);
    assert_eq!(err.detail, "connection refused");
}
