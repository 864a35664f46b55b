//! Tests for error types

use trueno_ab::Error;

#[test]
fn test_configuration_error() {
    let error = Error::Configuration("experiment 'x' has no variants".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid experiment configuration"));
    assert!(error_str.contains("has no variants"));
}

#[test]
fn test_unknown_variant_error() {
    let error = Error::UnknownVariant {
        experiment: "checkout".to_string(),
        variant_id: "purple".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown variant 'purple'"));
    assert!(error_str.contains("experiment 'checkout'"));
    assert!(error_str.contains("current experiment definition"));
}

#[test]
fn test_invalid_event_error() {
    let error = Error::InvalidEvent("negative amount".to_string());
    assert_eq!(format!("{error}"), "Invalid event: negative amount");
}

#[test]
fn test_registry_errors() {
    let unknown = Error::UnknownExperiment("pricing".to_string());
    assert!(format!("{unknown}").contains("Unknown experiment: pricing"));

    let duplicate = Error::DuplicateExperiment("pricing".to_string());
    assert!(format!("{duplicate}").contains("already registered"));
}

#[test]
fn test_serde_error_conversion() {
    let serde_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = serde_error.into();
    assert!(format!("{error}").contains("Serialization error"));
}

#[test]
fn test_error_debug() {
    let error = Error::UnknownExperiment("x".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("UnknownExperiment"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> trueno_ab::Result<i32> {
        Err(Error::InvalidEvent("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
