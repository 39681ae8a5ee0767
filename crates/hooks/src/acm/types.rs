//! Certificate and DNS data model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackhooks_common::{CertificateArn, Fqdn, HostedZoneId};

use super::error::AcmError;

/// TTL for DNS validation records (seconds)
pub const VALIDATION_RECORD_TTL: i64 = 300;

// =========================================================================
// Pagination
// =========================================================================

/// One page of a listing, with the cursor for the next page if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C = String> {
    pub items: Vec<T>,
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn new(items: Vec<T>, next: Option<C>) -> Self {
        Self { items, next }
    }
}

/// Continuation cursor for record set listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetCursor {
    pub name: String,
    pub record_type: String,
    pub identifier: Option<String>,
}

// =========================================================================
// Lookups
// =========================================================================

/// Outcome of a directory lookup
///
/// Not-found is an ordinary outcome; whether more than one match is an error
/// is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Ambiguous(Vec<T>),
}

impl<T> Lookup<T> {
    /// Classify a list of matches
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            _ => Lookup::Ambiguous(matches),
        }
    }
}

// =========================================================================
// Certificates
// =========================================================================

/// Certificate status as reported by the certificate authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum CertificateStatus {
    PendingValidation,
    Issued,
    Inactive,
    Expired,
    ValidationTimedOut,
    Revoked,
    Failed,
    /// A status this crate does not know about
    Other(String),
}

impl CertificateStatus {
    /// Parse the provider's status string
    pub fn from_api(status: &str) -> Self {
        match status {
            "PENDING_VALIDATION" => CertificateStatus::PendingValidation,
            "ISSUED" => CertificateStatus::Issued,
            "INACTIVE" => CertificateStatus::Inactive,
            "EXPIRED" => CertificateStatus::Expired,
            "VALIDATION_TIMED_OUT" => CertificateStatus::ValidationTimedOut,
            "REVOKED" => CertificateStatus::Revoked,
            "FAILED" => CertificateStatus::Failed,
            other => CertificateStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CertificateStatus::PendingValidation => "PENDING_VALIDATION",
            CertificateStatus::Issued => "ISSUED",
            CertificateStatus::Inactive => "INACTIVE",
            CertificateStatus::Expired => "EXPIRED",
            CertificateStatus::ValidationTimedOut => "VALIDATION_TIMED_OUT",
            CertificateStatus::Revoked => "REVOKED",
            CertificateStatus::Failed => "FAILED",
            CertificateStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<CertificateStatus> for String {
    fn from(status: CertificateStatus) -> Self {
        status.as_str().to_string()
    }
}

/// How domain ownership is proven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationMethod {
    Dns,
    Email,
}

impl ValidationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMethod::Dns => "DNS",
            ValidationMethod::Email => "EMAIL",
        }
    }
}

impl fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValidationMethod {
    type Err = AcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DNS" => Ok(ValidationMethod::Dns),
            "EMAIL" => Ok(ValidationMethod::Email),
            other => Err(AcmError::InvalidArgument(format!(
                "validation method must be DNS or EMAIL, got '{}'",
                other
            ))),
        }
    }
}

/// DNS record the certificate authority asks for as proof of ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    pub record_type: String,
    pub value: String,
}

/// Validation state of one domain on a certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainValidation {
    pub domain_name: String,
    pub validation_domain: Option<String>,
    pub validation_method: Option<ValidationMethod>,
    /// Present once the certificate authority has issued the DNS challenge
    pub resource_record: Option<ResourceRecord>,
}

/// Entry in a certificate listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub arn: CertificateArn,
    pub domain_name: String,
}

/// Full certificate detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub arn: CertificateArn,
    pub domain_name: Fqdn,
    pub subject_alternative_names: Vec<String>,
    pub status: CertificateStatus,
    pub domain_validation_options: Vec<DomainValidation>,
    pub failure_reason: Option<String>,
    pub revocation_reason: Option<String>,
    pub not_after: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Validation entry for the certificate's primary domain
    pub fn primary_validation(&self) -> Option<&DomainValidation> {
        self.domain_validation_options.first()
    }

    /// DNS challenge record for the primary domain, once the CA has issued it
    pub fn validation_resource_record(&self) -> Option<&ResourceRecord> {
        self.primary_validation()
            .and_then(|option| option.resource_record.as_ref())
    }
}

/// Ownership proof settings for one domain in a certificate request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainValidationOption {
    pub domain_name: String,
    pub validation_domain: String,
}

/// New certificate request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    pub domain_name: Fqdn,
    pub subject_alternative_names: Vec<String>,
    pub validation_method: ValidationMethod,
    pub domain_validation_options: Vec<DomainValidationOption>,
    pub idempotency_token: String,
}

// =========================================================================
// DNS
// =========================================================================

/// A hosted DNS zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: HostedZoneId,
    /// Zone name in absolute form (`example.com.`)
    pub name: String,
    pub private_zone: bool,
}

/// A DNS resource record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub name: String,
    pub record_type: String,
    pub ttl: Option<i64>,
    pub values: Vec<String>,
}

impl RecordSet {
    /// Record set proving ownership for a certificate validation challenge
    pub fn for_validation(record: &ResourceRecord) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            ttl: Some(VALIDATION_RECORD_TTL),
            values: vec![record.value.clone()],
        }
    }
}

/// Change applied to a record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordAction {
    Create,
    Delete,
    Upsert,
}

impl RecordAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordAction::Create => "CREATE",
            RecordAction::Delete => "DELETE",
            RecordAction::Upsert => "UPSERT",
        }
    }
}

impl fmt::Display for RecordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordAction {
    type Err = AcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(RecordAction::Create),
            "DELETE" => Ok(RecordAction::Delete),
            "UPSERT" => Ok(RecordAction::Upsert),
            other => Err(AcmError::InvalidArgument(format!(
                "\"action\" must be one of CREATE, DELETE, UPSERT, got '{}'",
                other
            ))),
        }
    }
}

/// One change inside a [`ChangeBatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetChange {
    pub action: RecordAction,
    pub record_set: RecordSet,
}

/// Batch of record set changes submitted to a hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    pub comment: String,
    pub changes: Vec<RecordSetChange>,
}

impl ChangeBatch {
    /// Batch holding a single change
    pub fn single(action: RecordAction, record_set: RecordSet, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            changes: vec![RecordSetChange { action, record_set }],
        }
    }
}
