//! Configuration linting for certificate blocks
//!
//! Flags blocks that will parse but are unlikely to do what was meant.

use std::collections::HashSet;

use validator::Validate;

use super::{ErrorCategory, ValidationError, ValidationResult, ValidationWarning};
use crate::certificate::CertificateAction;
use crate::StackConfig;

/// Lint a stack configuration
pub fn lint_config(config: &StackConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    for cert in &config.certificates {
        if let Err(e) = cert.validate() {
            result.add_error(ValidationError::new(
                ErrorCategory::Schema,
                format!("Certificate '{}': {}", cert.fqdn, e),
            ));
        }

        // Two blocks for one (fqdn, region) fight over the same certificate
        if !seen.insert((cert.fqdn.clone(), cert.region.clone())) {
            result.add_error(ValidationError::new(
                ErrorCategory::Conflict,
                format!(
                    "Certificate '{}' in region '{}' is configured more than once",
                    cert.fqdn, cert.region
                ),
            ));
        }

        let fqdn = cert.fqdn.as_str();
        let domain = cert.validation_domain.as_str();
        if fqdn != domain && !fqdn.ends_with(&format!(".{}", domain)) {
            result.add_warning(ValidationWarning::new(format!(
                "Certificate '{}' is not inside validation domain '{}'",
                fqdn, domain
            )));
        }

        let mut names = HashSet::new();
        names.insert(&cert.fqdn);
        for san in &cert.subject_alternative_names {
            if !names.insert(san) {
                result.add_warning(ValidationWarning::new(format!(
                    "Certificate '{}' lists '{}' more than once",
                    fqdn, san
                )));
            }
        }

        if cert.action == CertificateAction::Delete && !cert.subject_alternative_names.is_empty() {
            result.add_warning(ValidationWarning::new(format!(
                "Certificate '{}' has subject alternative names that are ignored by delete",
                fqdn
            )));
        }
    }

    result
}
