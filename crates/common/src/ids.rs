//! Type-safe identifier newtypes for stackhooks.
//!
//! These types provide compile-time safety for identifiers, preventing
//! accidental mixing of different ID types (e.g., passing a certificate ARN
//! where a hosted zone id is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region used when a caller does not name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Route 53 prefix on hosted zone ids returned by the list APIs.
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Fully-qualified domain name.
///
/// Stored lowercase without a trailing dot. DNS services report record and
/// zone names in absolute form (`example.com.`), so comparisons against them
/// go through [`Fqdn::absolute`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Fqdn(String);

impl Fqdn {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        Self(name.trim_end_matches('.').to_ascii_lowercase())
    }

    /// The relative form, e.g. `example.com`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The absolute form with a trailing dot, e.g. `example.com.`.
    pub fn absolute(&self) -> String {
        format!("{}.", self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fqdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Fqdn {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Fqdn {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Fqdn> for String {
    fn from(fqdn: Fqdn) -> Self {
        fqdn.0
    }
}

/// Hosted zone identifier.
///
/// Always the bare id (`Z0123456789ABC`); the `/hostedzone/` prefix the list
/// APIs attach is stripped on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostedZoneId(String);

impl HostedZoneId {
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref();
        Self(id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostedZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Certificate ARN, assigned by the certificate authority on request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateArn(String);

impl CertificateArn {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CertificateArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cloud region identifier (e.g. `us-west-2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region(String);

impl Region {
    pub fn new(region: impl AsRef<str>) -> Self {
        Self(region.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Region {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
