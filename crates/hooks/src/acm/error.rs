//! Certificate reconciliation error types

use std::fmt::Display;

use thiserror::Error;

/// Result type for certificate reconciliation operations
pub type AcmResult<T> = Result<T, AcmError>;

/// Errors that can occur while reconciling a certificate.
///
/// Every variant aborts the current lifecycle step. Conditions that a later
/// invocation can pick up (pending validation, an exhausted poll) are
/// reported as outcomes, not errors.
#[derive(Debug, Error)]
pub enum AcmError {
    /// Caller supplied an argument outside the accepted set
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// More than one hosted zone carries the same name
    #[error("Found multiple matching hosted zones for '{domain}': {}", .zone_ids.join(", "))]
    MultipleZones { domain: String, zone_ids: Vec<String> },

    /// More than one certificate exists for one FQDN
    #[error("Found multiple matching certificates for '{fqdn}': {}", .arns.join(", "))]
    MultipleCertificates { fqdn: String, arns: Vec<String> },

    /// More than one stale validation record matches the cleanup pattern
    #[error("Multiple certificate validation CNAME record sets found matching '{fqdn}': {}", .names.join(", "))]
    AmbiguousValidationRecord { fqdn: String, names: Vec<String> },

    /// A record change was requested for a domain with no hosted zone
    #[error("No hosted zone matches domain '{domain}'")]
    ZoneNotFound { domain: String },

    /// The certificate authority reports the request failed
    #[error("Certificate request for '{fqdn}' failed: {reason}")]
    CertificateFailed { fqdn: String, reason: String },

    /// The certificate has been revoked
    #[error("Certificate for '{fqdn}' is in revoked state: {reason}")]
    CertificateRevoked { fqdn: String, reason: String },

    /// The certificate is in a status the request action cannot act on
    #[error("Certificate for '{fqdn}' has status {status}")]
    UnexpectedStatus { fqdn: String, status: String },

    /// The certificate carries no domain validation options
    #[error("Certificate '{arn}' has no domain validation options")]
    MissingValidationOptions { arn: String },

    /// Remote service call failed
    #[error("{service} {operation} failed: {message}")]
    Service {
        service: &'static str,
        operation: &'static str,
        message: String,
    },

    /// Remote service answered without a field we depend on
    #[error("{service} returned a malformed response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },
}

impl AcmError {
    /// Build a [`AcmError::Service`] from any displayable provider error
    pub fn service(service: &'static str, operation: &'static str, err: impl Display) -> Self {
        AcmError::Service {
            service,
            operation,
            message: err.to_string(),
        }
    }

    /// Whether the error is an ambiguity the system refuses to resolve
    pub fn is_ambiguity(&self) -> bool {
        matches!(
            self,
            AcmError::MultipleZones { .. }
                | AcmError::MultipleCertificates { .. }
                | AcmError::AmbiguousValidationRecord { .. }
        )
    }

    /// Whether the error reflects a terminal certificate state
    pub fn is_terminal_state(&self) -> bool {
        matches!(
            self,
            AcmError::CertificateFailed { .. }
                | AcmError::CertificateRevoked { .. }
                | AcmError::UnexpectedStatus { .. }
        )
    }
}
