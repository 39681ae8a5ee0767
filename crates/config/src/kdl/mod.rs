//! KDL configuration parsing
//!
//! Converts KDL stack configuration files into [`StackConfig`].

mod certificate;
mod helpers;

use miette::Diagnostic;

use crate::error::{ConfigError, ConfigResult};
use crate::StackConfig;

pub use certificate::parse_certificate;
pub use helpers::offset_to_line_col;

/// Parse KDL text into a [`StackConfig`]
pub fn parse_kdl(content: &str) -> ConfigResult<StackConfig> {
    let doc: kdl::KdlDocument = content
        .parse()
        .map_err(|e: kdl::KdlError| ConfigError::Parse(render_kdl_error(content, &e)))?;

    parse_kdl_document(doc)
}

/// Convert a parsed KDL document to a [`StackConfig`]
pub fn parse_kdl_document(doc: kdl::KdlDocument) -> ConfigResult<StackConfig> {
    let mut certificates = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "certificate" => certificates.push(parse_certificate(node)?),
            other => {
                return Err(ConfigError::Parse(format!(
                    "Unknown top-level configuration block: '{}'\n\
                     Valid blocks are: certificate",
                    other
                )));
            }
        }
    }

    Ok(StackConfig { certificates })
}

/// Render a KDL parse error with line/column context
fn render_kdl_error(content: &str, e: &kdl::KdlError) -> String {
    let mut error_msg = String::from("KDL configuration parse error:\n\n");
    let lines: Vec<&str> = content.lines().collect();
    let mut found_details = false;

    if let Some(related) = e.related() {
        for diagnostic in related {
            error_msg.push_str(&format!("  {}\n", diagnostic));
            found_details = true;

            if let Some(labels) = diagnostic.labels() {
                for label in labels {
                    let (line, col) = offset_to_line_col(content, label.offset());
                    error_msg.push_str(&format!("\n  --> at line {}, column {}\n", line, col));
                    if let Some(lc) = lines.get(line.saturating_sub(1)) {
                        error_msg.push_str(&format!("{:>4} | {}\n", line, lc));
                        error_msg.push_str(&format!("     | {}^\n", " ".repeat(col.saturating_sub(1))));
                    }
                }
            }

            if let Some(help) = diagnostic.help() {
                error_msg.push_str(&format!("\n  help: {}\n", help));
            }
        }
    }

    if !found_details {
        error_msg.push_str(&format!("  {}\n", e));
    }

    error_msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_certificates() {
        let config = parse_kdl(
            r#"
            certificate "a.example.com" {
                action "request"
                validation-domain "example.com"
                region "us-east-1"
            }
            certificate "b.example.com" {
                action "delete"
                validation-domain "example.com"
                region "us-west-2"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.certificates.len(), 2);
        assert_eq!(config.certificates[1].region.as_str(), "us-west-2");
    }

    #[test]
    fn test_unknown_block_rejected() {
        let err = parse_kdl(r#"listener "http" { }"#).unwrap_err();
        assert!(err.to_string().contains("Unknown top-level configuration block"));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = parse_kdl("certificate \"a.example.com\" {").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
