//! Safety Limits Integration Tests
//!
//! Tests for input size limits and denylist patterns applied before a
//! document is sent to any outbound service.

use factcheck::config::ConfigFile;
use factcheck::core::{SafetyLimits, SafetyViolation};
use std::path::Path;

#[test]
fn test_max_input_bytes() {
    let limits = SafetyLimits {
        max_input_bytes: 100,
        ..Default::default()
    };

    // Input within limits
    let small_input = "x".repeat(50);
    assert!(limits.validate_input(&small_input, None).is_ok());

    // Input at exact limit
    let exact_input = "x".repeat(100);
    assert!(limits.validate_input(&exact_input, None).is_ok());

    // Input exceeding limit
    let large_input = "x".repeat(200);
    let result = limits.validate_input(&large_input, None);

    match result {
        Err(SafetyViolation::MaxInputBytes { actual, limit }) => {
            assert_eq!(actual, 200);
            assert_eq!(limit, 100);
        }
        _ => panic!("Expected MaxInputBytes violation"),
    }
}

#[test]
fn test_max_input_counts_bytes_not_chars() {
    let limits = SafetyLimits {
        max_input_bytes: 10,
        ..Default::default()
    };

    // 5 chars, 15 bytes
    assert!(limits.validate_input("日本語です", None).is_err());
    assert!(limits.validate_input("abc", None).is_ok());
}

#[test]
fn test_denylist_pattern_env() {
    let limits = SafetyLimits::default();

    assert!(limits.is_denylisted(".env"));
    assert!(limits.is_denylisted(".env.local"));
    assert!(limits.is_denylisted(".env.production"));
    assert!(limits.is_denylisted("config/.env"));
}

#[test]
fn test_denylist_pattern_secrets() {
    let limits = SafetyLimits::default();

    // Pattern is **/secrets*: only names that START with "secrets"
    assert!(limits.is_denylisted("secrets.json"));
    assert!(limits.is_denylisted("config/secrets.yaml"));
    assert!(limits.is_denylisted("deep/path/secrets-file"));
    assert!(!limits.is_denylisted("my-secrets-file"));
}

#[test]
fn test_denylist_pattern_credentials_and_keys() {
    let limits = SafetyLimits::default();

    assert!(limits.is_denylisted("credentials.json"));
    assert!(limits.is_denylisted("aws-credential-file"));
    assert!(limits.is_denylisted("server.pem"));
    assert!(limits.is_denylisted("ssl/domain.key"));
}

#[test]
fn test_denylist_allows_documents() {
    let limits = SafetyLimits::default();

    assert!(!limits.is_denylisted("report.txt"));
    assert!(!limits.is_denylisted("notes/q3-earnings.md"));
    assert!(!limits.is_denylisted("README.md"));
    assert!(!limits.is_denylisted("press-release.txt"));
}

#[test]
fn test_validate_input_with_denylisted_path() {
    let limits = SafetyLimits::default();
    let input = "Revenue grew 12% in 2023.";

    assert!(limits.validate_input(input, Some(Path::new("docs/report.txt"))).is_ok());

    let result = limits.validate_input(input, Some(Path::new(".env.local")));
    match result {
        Err(SafetyViolation::DenylistMatch { path }) => {
            assert!(path.contains(".env.local"));
        }
        _ => panic!("Expected DenylistMatch violation"),
    }
}

#[test]
fn test_custom_denylist_patterns() {
    let limits = SafetyLimits {
        denylist_patterns: vec!["**/*.secret".to_string(), "**/private/*".to_string()],
        ..Default::default()
    };

    assert!(limits.is_denylisted("config.secret"));
    assert!(limits.is_denylisted("data/private/notes.txt"));

    // Default patterns should NOT be present
    assert!(!limits.is_denylisted(".env"));
}

#[test]
fn test_safety_limits_yaml_parsing() {
    let yaml = r#"
version: "1.0"
safety:
  max_input_bytes: 1048576
  denylist_patterns:
    - "**/*.password"
    - "**/api_keys/*"
"#;

    let config: ConfigFile = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.safety.max_input_bytes, 1048576);
    assert_eq!(config.safety.denylist_patterns.len(), 2);
    assert!(config.safety.is_denylisted("db.password"));
}

#[test]
fn test_safety_limits_default_values() {
    let limits = SafetyLimits::default();
    assert_eq!(limits.max_input_bytes, 10 * 1024 * 1024); // 10MB
    assert_eq!(limits.denylist_patterns.len(), 5);
}
