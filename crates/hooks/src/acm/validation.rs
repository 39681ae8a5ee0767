//! Validation coordinator
//!
//! Pushes a pending certificate forward along its validation method: publish
//! the DNS challenge record, or have the validation email sent again.

use std::sync::Arc;

use serde::Serialize;
use stackhooks_common::Fqdn;
use tracing::{info, warn};

use super::error::{AcmError, AcmResult};
use super::provider::CertificateAuthority;
use super::types::{Certificate, RecordAction, RecordSet, ValidationMethod};
use super::zones::ZoneDirectory;

/// Change comment attached to validation record upserts
pub const VALIDATION_RECORD_COMMENT: &str = "acm cert validation";

/// What the coordinator did to move validation along
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationDispatch {
    /// DNS challenge record published in the validation zone
    RecordUpserted { record: RecordSet },
    /// DNS validation, but the authority has not issued the challenge yet
    RecordPending,
    /// Validation email sent again
    EmailResent,
}

#[derive(Debug, Clone)]
pub struct ValidationCoordinator {
    authority: Arc<dyn CertificateAuthority>,
    zones: ZoneDirectory,
}

impl ValidationCoordinator {
    pub fn new(authority: Arc<dyn CertificateAuthority>, zones: ZoneDirectory) -> Self {
        Self { authority, zones }
    }

    /// Dispatch validation for a pending certificate.
    ///
    /// The primary domain's validation option decides the method; a missing
    /// method is treated as email.
    pub async fn request_validation(
        &self,
        certificate: &Certificate,
        validation_domain: &Fqdn,
    ) -> AcmResult<ValidationDispatch> {
        let option = certificate
            .primary_validation()
            .ok_or_else(|| AcmError::MissingValidationOptions {
                arn: certificate.arn.to_string(),
            })?;

        match option.validation_method.unwrap_or(ValidationMethod::Email) {
            ValidationMethod::Dns => match &option.resource_record {
                Some(challenge) => {
                    let record = RecordSet::for_validation(challenge);
                    self.zones
                        .mutate_record_set(
                            &record,
                            validation_domain,
                            RecordAction::Upsert,
                            VALIDATION_RECORD_COMMENT,
                        )
                        .await?;
                    info!(arn = %certificate.arn, name = %record.name, "Published validation record");
                    Ok(ValidationDispatch::RecordUpserted { record })
                }
                None => {
                    warn!(
                        arn = %certificate.arn,
                        "DNS validation record not available yet, retry on the next run"
                    );
                    Ok(ValidationDispatch::RecordPending)
                }
            },
            ValidationMethod::Email => {
                self.authority
                    .resend_validation_email(
                        &certificate.arn,
                        certificate.domain_name.as_str(),
                        validation_domain.as_str(),
                    )
                    .await?;
                info!(arn = %certificate.arn, "Resent validation email");
                Ok(ValidationDispatch::EmailResent)
            }
        }
    }
}
