//! Certificate lifecycle controller
//!
//! Inspects the current certificate for an FQDN and takes exactly one step
//! toward the requested state. Incomplete states are left for the next
//! invocation; nothing here retries beyond the bounded issuance poll.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use stackhooks_common::{CertificateArn, Fqdn};
use stackhooks_config::{CertificateAction, CertificateHookConfig, ZoneVisibility};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::certificates::CertificateDirectory;
use super::error::{AcmError, AcmResult};
use super::provider::RegionalServices;
use super::types::{
    CertificateRequest, CertificateStatus, DomainValidationOption, Lookup, RecordAction, RecordSet,
    ValidationMethod,
};
use super::validation::{ValidationCoordinator, ValidationDispatch, VALIDATION_RECORD_COMMENT};
use super::zones::{RecordMatcher, ZoneDirectory};

/// Default delay between issuance checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of issuance checks
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// Hex characters of the request digest used as idempotency token
const IDEMPOTENCY_TOKEN_LENGTH: usize = 32;

/// Change comment attached to stale validation record deletes
const VALIDATION_CLEANUP_COMMENT: &str = "acm cert validation cleanup";

/// Requests made by this process, mixed into each request nonce
static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Bounded issuance poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Longest time the poll can take
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Result of one controller run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Certificate already issued; nothing changed
    AlreadyIssued {
        arn: CertificateArn,
        not_after: Option<DateTime<Utc>>,
    },
    /// New certificate requested
    Requested {
        arn: CertificateArn,
        status: CertificateStatus,
        validation_record: Option<RecordSet>,
    },
    /// Pending certificate pushed along its validation method
    ValidationRequested {
        arn: CertificateArn,
        dispatch: ValidationDispatch,
    },
    /// Timed-out certificate replaced by a new request
    Reissued {
        previous_arn: CertificateArn,
        arn: CertificateArn,
        status: CertificateStatus,
        validation_record: Option<RecordSet>,
    },
    /// Certificate and stale validation record removed, where present
    Deleted {
        arn: Option<CertificateArn>,
        validation_record: Option<RecordSet>,
    },
}

/// Certificate state after a request and its poll
#[derive(Debug)]
struct Issuance {
    arn: CertificateArn,
    status: CertificateStatus,
    validation_record: Option<RecordSet>,
}

/// Drives a certificate toward the state a hook invocation asks for
#[derive(Debug, Clone)]
pub struct LifecycleController {
    certificates: CertificateDirectory,
    zones: ZoneDirectory,
    validation: ValidationCoordinator,
    poll: PollPolicy,
}

impl LifecycleController {
    /// Build a controller whose zone lookups only consider `visibility` zones
    pub fn new(services: RegionalServices, visibility: ZoneVisibility) -> Self {
        let certificates = CertificateDirectory::new(services.certificate_authority.clone());
        let zones = ZoneDirectory::new(services.dns, visibility);
        let validation = ValidationCoordinator::new(services.certificate_authority, zones.clone());

        Self {
            certificates,
            zones,
            validation,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Run the configured action
    pub async fn run(&self, config: &CertificateHookConfig) -> AcmResult<ReconcileOutcome> {
        info!(
            action = %config.action,
            fqdn = %config.fqdn,
            validation_domain = %config.validation_domain,
            region = %config.region,
            "Reconciling certificate"
        );

        match config.action {
            CertificateAction::Request => self.request(config).await,
            CertificateAction::Delete => self.delete(config).await,
        }
    }

    async fn request(&self, config: &CertificateHookConfig) -> AcmResult<ReconcileOutcome> {
        let Some(certificate) = self.certificates.get_certificate(&config.fqdn).await? else {
            info!(fqdn = %config.fqdn, "Requesting certificate");
            let issued = self.issue(config).await?;
            return Ok(ReconcileOutcome::Requested {
                arn: issued.arn,
                status: issued.status,
                validation_record: issued.validation_record,
            });
        };

        info!(
            fqdn = %config.fqdn,
            arn = %certificate.arn,
            status = %certificate.status,
            "Found existing certificate"
        );

        let status = certificate.status.clone();
        match status {
            CertificateStatus::Issued => {
                info!(
                    arn = %certificate.arn,
                    not_after = ?certificate.not_after,
                    "Certificate already issued"
                );
                Ok(ReconcileOutcome::AlreadyIssued {
                    arn: certificate.arn,
                    not_after: certificate.not_after,
                })
            }
            CertificateStatus::PendingValidation => {
                let dispatch = self
                    .validation
                    .request_validation(&certificate, &config.validation_domain)
                    .await?;
                Ok(ReconcileOutcome::ValidationRequested {
                    arn: certificate.arn,
                    dispatch,
                })
            }
            CertificateStatus::ValidationTimedOut => {
                info!(arn = %certificate.arn, "Deleting timed-out certificate before requesting again");
                self.certificates.delete_certificate(&certificate.arn).await?;

                let issued = self.issue(config).await?;
                Ok(ReconcileOutcome::Reissued {
                    previous_arn: certificate.arn,
                    arn: issued.arn,
                    status: issued.status,
                    validation_record: issued.validation_record,
                })
            }
            CertificateStatus::Failed => Err(AcmError::CertificateFailed {
                fqdn: config.fqdn.to_string(),
                reason: certificate.failure_reason.unwrap_or_else(|| "unknown".to_string()),
            }),
            CertificateStatus::Revoked => Err(AcmError::CertificateRevoked {
                fqdn: config.fqdn.to_string(),
                reason: certificate.revocation_reason.unwrap_or_else(|| "unknown".to_string()),
            }),
            other => Err(AcmError::UnexpectedStatus {
                fqdn: config.fqdn.to_string(),
                status: other.to_string(),
            }),
        }
    }

    /// Request a new certificate and poll it toward issuance
    async fn issue(&self, config: &CertificateHookConfig) -> AcmResult<Issuance> {
        let method = match self.zones.resolve_zone_id(&config.validation_domain).await? {
            Some(_) => ValidationMethod::Dns,
            None => {
                warn!(
                    validation_domain = %config.validation_domain,
                    "No hosted zone for validation domain, falling back to email validation"
                );
                ValidationMethod::Email
            }
        };

        let request = build_request(config, method, &request_nonce());
        let arn = self.certificates.request_certificate(&request).await?;

        self.wait_for_issuance(arn, &config.validation_domain, method).await
    }

    /// Poll the new certificate, publishing the DNS challenge once it appears.
    ///
    /// Running out of attempts is not an error; the certificate stays pending.
    async fn wait_for_issuance(
        &self,
        arn: CertificateArn,
        validation_domain: &Fqdn,
        method: ValidationMethod,
    ) -> AcmResult<Issuance> {
        let start = Instant::now();
        debug!(
            arn = %arn,
            method = %method,
            ceiling_secs = self.poll.ceiling().as_secs(),
            "Waiting for issuance"
        );
        let mut status = CertificateStatus::PendingValidation;
        let mut validation_record = None;

        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;

            let certificate = self.certificates.describe(&arn).await?;
            status = certificate.status.clone();

            if method == ValidationMethod::Dns && validation_record.is_none() {
                if let Some(challenge) = certificate.validation_resource_record() {
                    let record = RecordSet::for_validation(challenge);
                    self.zones
                        .mutate_record_set(
                            &record,
                            validation_domain,
                            RecordAction::Upsert,
                            VALIDATION_RECORD_COMMENT,
                        )
                        .await?;
                    validation_record = Some(record);
                }
            }

            match &status {
                CertificateStatus::Issued => {
                    info!(
                        arn = %arn,
                        attempt,
                        elapsed_secs = start.elapsed().as_secs(),
                        "Certificate issued"
                    );
                    break;
                }
                CertificateStatus::Failed => {
                    return Err(AcmError::CertificateFailed {
                        fqdn: certificate.domain_name.to_string(),
                        reason: certificate.failure_reason.unwrap_or_else(|| "unknown".to_string()),
                    });
                }
                _ => debug!(arn = %arn, attempt, status = %status, "Certificate not issued yet"),
            }
        }

        if status != CertificateStatus::Issued {
            warn!(
                arn = %arn,
                status = %status,
                attempts = self.poll.max_attempts,
                elapsed_secs = start.elapsed().as_secs(),
                "Certificate not issued within the poll window, leaving it for the next run"
            );
        }

        Ok(Issuance {
            arn,
            status,
            validation_record,
        })
    }

    async fn delete(&self, config: &CertificateHookConfig) -> AcmResult<ReconcileOutcome> {
        let arn = self.certificates.find_certificate_arn(&config.fqdn).await?;
        let stale = self.find_stale_validation_record(config).await?;

        if let Some(arn) = &arn {
            self.certificates.delete_certificate(arn).await?;
        } else {
            debug!(fqdn = %config.fqdn, "No certificate to delete");
        }

        if let Some(record) = &stale {
            info!(fqdn = %config.fqdn, name = %record.name, "Deleting stale validation record");
            self.zones
                .mutate_record_set(
                    record,
                    &config.validation_domain,
                    RecordAction::Delete,
                    VALIDATION_CLEANUP_COMMENT,
                )
                .await?;
        }

        Ok(ReconcileOutcome::Deleted {
            arn,
            validation_record: stale,
        })
    }

    async fn find_stale_validation_record(
        &self,
        config: &CertificateHookConfig,
    ) -> AcmResult<Option<RecordSet>> {
        let pattern = stale_validation_pattern(&config.fqdn);
        let matcher = RecordMatcher::from_parts(None, Some(pattern.as_str()))?;

        match self
            .zones
            .find_record_set(&config.validation_domain, &matcher, Some("CNAME"))
            .await?
        {
            Lookup::Found(record) => Ok(Some(record)),
            Lookup::NotFound => Ok(None),
            Lookup::Ambiguous(records) => Err(AcmError::AmbiguousValidationRecord {
                fqdn: config.fqdn.absolute(),
                names: records.into_iter().map(|r| r.name).collect(),
            }),
        }
    }
}

/// Case-insensitive pattern for the validation CNAME the certificate
/// authority issues for `fqdn`
pub fn stale_validation_pattern(fqdn: &Fqdn) -> String {
    format!(r"(?i)^_[0-9a-f]{{32}}\.{}$", regex::escape(&fqdn.absolute()))
}

/// Nonce unique to one certificate request made by one run
fn request_nonce() -> String {
    format!(
        "{}:{}:{}",
        Utc::now().timestamp_millis(),
        std::process::id(),
        REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

/// Idempotency token for a certificate request
///
/// SDK retries of one request share a token. A request made after a delete
/// carries a new nonce and therefore a new token.
pub fn idempotency_token(
    fqdn: &Fqdn,
    subject_alternative_names: &[String],
    method: ValidationMethod,
    nonce: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fqdn.as_str().as_bytes());
    for name in subject_alternative_names {
        hasher.update(b",");
        hasher.update(name.as_bytes());
    }
    hasher.update(b"|");
    hasher.update(method.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(nonce.as_bytes());

    let mut token = hex::encode(hasher.finalize());
    token.truncate(IDEMPOTENCY_TOKEN_LENGTH);
    token
}

/// Build the certificate request for a hook configuration
pub fn build_request(
    config: &CertificateHookConfig,
    method: ValidationMethod,
    nonce: &str,
) -> CertificateRequest {
    let subject_alternative_names = config.subject_alternative_name_strings();

    let domain_validation_options = std::iter::once(config.fqdn.to_string())
        .chain(subject_alternative_names.iter().cloned())
        .map(|domain_name| DomainValidationOption {
            domain_name,
            validation_domain: config.validation_domain.to_string(),
        })
        .collect();

    CertificateRequest {
        domain_name: config.fqdn.clone(),
        idempotency_token: idempotency_token(&config.fqdn, &subject_alternative_names, method, nonce),
        subject_alternative_names,
        validation_method: method,
        domain_validation_options,
    }
}
