//! Certificate lifecycle reconciliation
//!
//! Keeps a certificate authority certificate and its DNS validation record in
//! line with what a stack asks for.
//!
//! # Architecture
//!
//! The module consists of four components:
//!
//! - [`ZoneDirectory`] - Resolves hosted zones and finds or changes record sets
//! - [`CertificateDirectory`] - Finds certificates by FQDN and wraps CA calls
//! - [`ValidationCoordinator`] - Publishes the DNS challenge or resends the email
//! - [`LifecycleController`] - The request/delete state machine
//!
//! Remote services sit behind [`CertificateAuthority`] and [`DnsService`];
//! [`aws`] provides the AWS Certificate Manager and Route 53 backends.
//!
//! # Request Flow
//!
//! 1. [`CertificateDirectory`] looks up the certificate for the FQDN
//! 2. With none, the validation zone decides DNS or email validation
//! 3. The request is submitted and polled for at most 30 x 10 seconds
//! 4. When the CA hands out the DNS challenge, the record is upserted
//! 5. A pending certificate found on a later run is pushed along by
//!    [`ValidationCoordinator`]; a timed-out one is replaced
//!
//! Duplicate zones, certificates or stale validation records are errors.
//! The controller never picks one.

pub mod aws;
mod certificates;
mod error;
mod lifecycle;
mod provider;
mod types;
mod validation;
mod zones;

#[cfg(test)]
pub(crate) mod mock;

pub use certificates::CertificateDirectory;
pub use error::{AcmError, AcmResult};
pub use lifecycle::{
    build_request, idempotency_token, stale_validation_pattern, LifecycleController, PollPolicy,
    ReconcileOutcome, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};
pub use provider::{CertificateAuthority, DnsService, RegionalServices, ServiceConnector};
pub use types::{
    Certificate, CertificateRequest, CertificateStatus, CertificateSummary, ChangeBatch,
    DomainValidation, DomainValidationOption, HostedZone, Lookup, Page, RecordAction, RecordSet,
    RecordSetChange, RecordSetCursor, ResourceRecord, ValidationMethod, VALIDATION_RECORD_TTL,
};
pub use validation::{ValidationCoordinator, ValidationDispatch, VALIDATION_RECORD_COMMENT};
pub use zones::{RecordMatcher, ZoneDirectory};
