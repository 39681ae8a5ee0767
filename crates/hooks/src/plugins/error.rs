//! Hook and resolver error types

use stackhooks_config::ConfigError;
use thiserror::Error;

use crate::acm::AcmError;

/// Result type for hook and resolver runs
pub type HookResult<T> = Result<T, HookError>;

#[derive(Debug, Error)]
pub enum HookError {
    /// Arguments or configuration rejected before any remote call
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reconciliation failed
    #[error(transparent)]
    Acm(#[from] AcmError),
}

impl HookError {
    /// Whether the error was raised before any remote call
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            HookError::Config(_) | HookError::Acm(AcmError::InvalidArgument(_))
        )
    }

    /// Short failure class for logs and exit codes
    pub fn kind(&self) -> &'static str {
        match self {
            HookError::Config(_) | HookError::Acm(AcmError::InvalidArgument(_)) => "config",
            HookError::Acm(e) if e.is_ambiguity() => "ambiguity",
            HookError::Acm(e) if e.is_terminal_state() => "terminal_state",
            HookError::Acm(_) => "service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let err = HookError::from(ConfigError::InvalidAction("renew".to_string()));
        assert!(err.is_config());
        assert_eq!(err.kind(), "config");

        let err = HookError::from(AcmError::InvalidArgument("bad pattern".to_string()));
        assert!(err.is_config());
        assert_eq!(err.kind(), "config");

        let err = HookError::from(AcmError::MultipleCertificates {
            fqdn: "demo.example.com".to_string(),
            arns: vec!["a".to_string(), "b".to_string()],
        });
        assert!(!err.is_config());
        assert_eq!(err.kind(), "ambiguity");

        let err = HookError::from(AcmError::CertificateRevoked {
            fqdn: "demo.example.com".to_string(),
            reason: "KEY_COMPROMISE".to_string(),
        });
        assert_eq!(err.kind(), "terminal_state");

        let err = HookError::from(AcmError::service("route53", "ListHostedZones", "throttled"));
        assert_eq!(err.kind(), "service");
    }
}
