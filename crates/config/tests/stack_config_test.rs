//! Integration tests for loading stack configuration files.

use std::io::Write;

use stackhooks_config::{lint_config, CertificateAction, ConfigError, StackConfig, ZoneVisibility};

fn write_config(extension: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_kdl_file() {
    let file = write_config(
        "kdl",
        r#"
        certificate "ashley-demo.example.com" {
            action "request"
            validation-domain "example.com"
            region "us-east-1"
            subject-alternative-names "www.ashley-demo.example.com" "adem.example.com"
        }
        "#,
    );

    let config = StackConfig::from_file(file.path()).unwrap();

    assert_eq!(config.certificates.len(), 1);
    let cert = &config.certificates[0];
    assert_eq!(cert.action, CertificateAction::Request);
    assert_eq!(
        cert.subject_alternative_name_strings(),
        vec!["www.ashley-demo.example.com", "adem.example.com"]
    );
    assert!(config.validate().is_ok());
    assert!(lint_config(&config).is_valid());
}

#[test]
fn test_load_toml_file() {
    let file = write_config(
        "toml",
        r#"
        [[certificate]]
        action = "delete"
        fqdn = "demo.example.com"
        validation-domain = "example.com"
        region = "us-west-2"
        "#,
    );

    let config = StackConfig::from_file(file.path()).unwrap();
    assert_eq!(config.certificates[0].action, CertificateAction::Delete);
    assert_eq!(config.certificates[0].zone_visibility, ZoneVisibility::All);
}

#[test]
fn test_load_toml_zone_visibility() {
    let file = write_config(
        "toml",
        r#"
        [[certificate]]
        action = "request"
        fqdn = "demo.example.com"
        validation-domain = "example.com"
        region = "us-east-1"
        zone-visibility = "private"
        "#,
    );

    let config = StackConfig::from_file(file.path()).unwrap();
    assert_eq!(config.certificates[0].zone_visibility, ZoneVisibility::Private);
}

#[test]
fn test_unsupported_extension() {
    let file = write_config("yaml", "certificate: []");

    let err = StackConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
}

#[test]
fn test_missing_file() {
    let err = StackConfig::from_file("/nonexistent/stack.kdl").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_kdl_syntax_error_has_location() {
    let file = write_config("kdl", "certificate \"a.example.com\" {\n    action \"request\"\n");

    let err = StackConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("KDL configuration parse error"));
}
