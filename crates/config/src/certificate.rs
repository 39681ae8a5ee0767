//! Certificate hook configuration.
//!
//! The typed counterpart of the orchestration tool's `acm_certificate` hook
//! arguments. Everything here is validated at the boundary so the
//! reconciliation core only ever sees well-formed input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stackhooks_common::{Fqdn, Region};
use tracing::{debug, warn};
use validator::{Validate, ValidationError};

use crate::arguments::HookArguments;
use crate::error::{ConfigError, ConfigResult};

/// Keyword arguments the certificate hook requires.
pub const REQUIRED_HOOK_ARGUMENTS: [&str; 4] = ["action", "cert_fqdn", "validation_domain", "region"];

/// Optional keyword argument carrying comma-separated SANs.
pub const SUBJECT_ALTERNATIVE_NAMES_ARGUMENT: &str = "subalt_names";

/// Optional keyword argument restricting hosted zone lookups.
pub const ZONE_VISIBILITY_ARGUMENT: &str = "zone_visibility";

/// Maximum length of a domain name in presentation format
const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum length of a single DNS label
const MAX_LABEL_LENGTH: usize = 63;

/// Lifecycle action requested of the certificate hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateAction {
    /// Make sure a certificate exists and is moving towards issuance
    Request,
    /// Remove the certificate and its stale DNS validation record
    Delete,
}

impl FromStr for CertificateAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "request" => Ok(CertificateAction::Request),
            "delete" => Ok(CertificateAction::Delete),
            other => Err(ConfigError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for CertificateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateAction::Request => write!(f, "request"),
            CertificateAction::Delete => write!(f, "delete"),
        }
    }
}

/// Which hosted zones are searched when resolving a domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneVisibility {
    #[default]
    All,
    Public,
    Private,
}

impl ZoneVisibility {
    /// Whether a zone with the given privacy flag is searched
    pub fn admits(&self, private_zone: bool) -> bool {
        match self {
            ZoneVisibility::All => true,
            ZoneVisibility::Public => !private_zone,
            ZoneVisibility::Private => private_zone,
        }
    }
}

impl FromStr for ZoneVisibility {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(ZoneVisibility::All),
            "public" => Ok(ZoneVisibility::Public),
            "private" => Ok(ZoneVisibility::Private),
            other => Err(ConfigError::invalid_argument(
                ZONE_VISIBILITY_ARGUMENT,
                format!("must be one of \"all\", \"public\", \"private\" (got '{}')", other),
            )),
        }
    }
}

impl fmt::Display for ZoneVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneVisibility::All => write!(f, "all"),
            ZoneVisibility::Public => write!(f, "public"),
            ZoneVisibility::Private => write!(f, "private"),
        }
    }
}

/// Configuration of one certificate hook invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct CertificateHookConfig {
    /// What to do with the certificate
    pub action: CertificateAction,

    /// Domain name of the certificate
    #[validate(custom(function = "validate_fqdn"))]
    pub fqdn: Fqdn,

    /// DNS domain whose hosted zone proves ownership
    #[validate(custom(function = "validate_fqdn"))]
    pub validation_domain: Fqdn,

    /// Region the certificate lives in
    #[validate(custom(function = "validate_region"))]
    pub region: Region,

    /// Additional names covered by the certificate
    #[serde(default)]
    #[validate(custom(function = "validate_subject_alternative_names"))]
    pub subject_alternative_names: Vec<Fqdn>,

    /// Hosted zones considered for the validation domain
    #[serde(default)]
    pub zone_visibility: ZoneVisibility,
}

impl CertificateHookConfig {
    /// Build a configuration from the hook's keyword argument string.
    ///
    /// Every missing required key is reported in a single error.
    pub fn from_arguments(args: &HookArguments) -> ConfigResult<Self> {
        let missing: Vec<String> = REQUIRED_HOOK_ARGUMENTS
            .iter()
            .filter(|key| !args.contains(key))
            .map(|key| key.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingArguments { missing });
        }

        for key in args.keys() {
            let optional = key == SUBJECT_ALTERNATIVE_NAMES_ARGUMENT || key == ZONE_VISIBILITY_ARGUMENT;
            if !REQUIRED_HOOK_ARGUMENTS.contains(&key) && !optional {
                warn!(argument = %key, "Ignoring unknown certificate hook argument");
            }
        }

        let required = |key: &str| args.get(key).unwrap_or_default();

        let subject_alternative_names = args
            .get(SUBJECT_ALTERNATIVE_NAMES_ARGUMENT)
            .map(split_names)
            .unwrap_or_default();

        let zone_visibility = args
            .get(ZONE_VISIBILITY_ARGUMENT)
            .map(str::parse::<ZoneVisibility>)
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            action: required("action").parse()?,
            fqdn: Fqdn::new(required("cert_fqdn")),
            validation_domain: Fqdn::new(required("validation_domain")),
            region: Region::new(required("region")),
            subject_alternative_names,
            zone_visibility,
        };

        config.validate()?;

        debug!(
            action = %config.action,
            fqdn = %config.fqdn,
            validation_domain = %config.validation_domain,
            region = %config.region,
            san_count = config.subject_alternative_names.len(),
            zone_visibility = %config.zone_visibility,
            "Parsed certificate hook arguments"
        );

        Ok(config)
    }

    /// Subject alternative names as plain strings, in configured order
    pub fn subject_alternative_name_strings(&self) -> Vec<String> {
        self.subject_alternative_names
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}

/// Split a comma-separated list of names, dropping empty items
pub fn split_names(list: &str) -> Vec<Fqdn> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Fqdn::new)
        .collect()
}

/// Check that a name is a syntactically valid (optionally wildcard) domain
pub fn is_valid_domain_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_DOMAIN_LENGTH {
        return false;
    }

    let name = name.strip_prefix("*.").unwrap_or(name);

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

fn validate_fqdn(fqdn: &Fqdn) -> Result<(), ValidationError> {
    if fqdn.is_empty() {
        return Err(ValidationError::new("required")
            .with_message("a domain name is required".into()));
    }
    if !is_valid_domain_name(fqdn.as_str()) {
        return Err(ValidationError::new("domain_name")
            .with_message(format!("'{}' is not a valid domain name", fqdn).into()));
    }
    Ok(())
}

fn validate_region(region: &Region) -> Result<(), ValidationError> {
    let valid = !region.as_str().is_empty()
        && region
            .as_str()
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(ValidationError::new("region")
            .with_message(format!("'{}' is not a valid region", region).into()));
    }
    Ok(())
}

fn validate_subject_alternative_names(names: &Vec<Fqdn>) -> Result<(), ValidationError> {
    for name in names {
        validate_fqdn(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> HookArguments {
        HookArguments::parse(s).unwrap()
    }

    #[test]
    fn test_from_arguments_full() {
        let config = CertificateHookConfig::from_arguments(&args(
            "action=request cert_fqdn=ashley-demo.example.com \
             subalt_names=www.ashley-demo.example.com,adem.example.com \
             validation_domain=example.com region=us-east-1",
        ))
        .unwrap();

        assert_eq!(config.action, CertificateAction::Request);
        assert_eq!(config.fqdn.as_str(), "ashley-demo.example.com");
        assert_eq!(config.validation_domain.as_str(), "example.com");
        assert_eq!(config.region.as_str(), "us-east-1");
        assert_eq!(
            config.subject_alternative_name_strings(),
            vec!["www.ashley-demo.example.com", "adem.example.com"]
        );
    }

    #[test]
    fn test_from_arguments_without_sans() {
        let config = CertificateHookConfig::from_arguments(&args(
            "action=delete cert_fqdn=demo.example.com validation_domain=example.com region=us-west-2",
        ))
        .unwrap();

        assert_eq!(config.action, CertificateAction::Delete);
        assert!(config.subject_alternative_names.is_empty());
        assert_eq!(config.zone_visibility, ZoneVisibility::All);
    }

    #[test]
    fn test_from_arguments_zone_visibility() {
        let config = CertificateHookConfig::from_arguments(&args(
            "action=request cert_fqdn=demo.example.com validation_domain=example.com \
             region=us-east-1 zone_visibility=private",
        ))
        .unwrap();
        assert_eq!(config.zone_visibility, ZoneVisibility::Private);

        let err = CertificateHookConfig::from_arguments(&args(
            "action=request cert_fqdn=demo.example.com validation_domain=example.com \
             region=us-east-1 zone_visibility=internal",
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument { ref key, .. } if key == "zone_visibility"));
    }

    #[test]
    fn test_zone_visibility_admits() {
        assert!(ZoneVisibility::All.admits(true));
        assert!(ZoneVisibility::All.admits(false));
        assert!(ZoneVisibility::Private.admits(true));
        assert!(!ZoneVisibility::Private.admits(false));
        assert!(ZoneVisibility::Public.admits(false));
        assert!(!ZoneVisibility::Public.admits(true));
    }

    #[test]
    fn test_from_arguments_reports_all_missing() {
        let err = CertificateHookConfig::from_arguments(&args("action=request")).unwrap_err();

        match err {
            ConfigError::MissingArguments { missing } => {
                assert_eq!(missing, vec!["cert_fqdn", "validation_domain", "region"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_arguments_invalid_action() {
        let err = CertificateHookConfig::from_arguments(&args(
            "action=renew cert_fqdn=demo.example.com validation_domain=example.com region=us-east-1",
        ))
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidAction(a) if a == "renew"));
    }

    #[test]
    fn test_from_arguments_invalid_domain() {
        let err = CertificateHookConfig::from_arguments(&args(
            "action=request cert_fqdn=bad..name validation_domain=example.com region=us-east-1",
        ))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_split_names_skips_empty() {
        let names = split_names("a.example.com, ,b.example.com,");
        assert_eq!(names, vec![Fqdn::new("a.example.com"), Fqdn::new("b.example.com")]);
    }

    #[test]
    fn test_is_valid_domain_name() {
        assert!(is_valid_domain_name("example.com"));
        assert!(is_valid_domain_name("*.example.com"));
        assert!(is_valid_domain_name("_abc.example.com"));
        assert!(!is_valid_domain_name(""));
        assert!(!is_valid_domain_name("-bad.example.com"));
        assert!(!is_valid_domain_name("bad..example.com"));
        assert!(!is_valid_domain_name(&"a".repeat(64)));
    }

    #[test]
    fn test_action_round_trip_display() {
        assert_eq!("request".parse::<CertificateAction>().unwrap().to_string(), "request");
        assert_eq!("delete".parse::<CertificateAction>().unwrap().to_string(), "delete");
    }
}
