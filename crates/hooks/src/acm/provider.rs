//! Remote service seams
//!
//! The reconciliation core talks to the certificate authority and the DNS
//! service only through these traits. The AWS backends live in
//! [`super::aws`]; tests substitute in-memory doubles.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use stackhooks_common::{CertificateArn, HostedZoneId, Region};

use super::error::AcmResult;
use super::types::{
    Certificate, CertificateRequest, CertificateSummary, ChangeBatch, HostedZone, Page, RecordSet,
    RecordSetCursor,
};

/// Certificate authority operations
///
/// Implementations are bound to a single region at construction time.
#[async_trait]
pub trait CertificateAuthority: Send + Sync + Debug {
    /// Fetch one page of the certificate listing
    async fn list_certificates(
        &self,
        next_token: Option<String>,
    ) -> AcmResult<Page<CertificateSummary>>;

    /// Fetch the full detail of a certificate
    async fn describe_certificate(&self, arn: &CertificateArn) -> AcmResult<Certificate>;

    /// Request a new certificate, returning its ARN
    async fn request_certificate(&self, request: &CertificateRequest) -> AcmResult<CertificateArn>;

    /// Delete a certificate
    async fn delete_certificate(&self, arn: &CertificateArn) -> AcmResult<()>;

    /// Ask the authority to send the validation email again
    async fn resend_validation_email(
        &self,
        arn: &CertificateArn,
        domain: &str,
        validation_domain: &str,
    ) -> AcmResult<()>;
}

/// DNS hosting operations
#[async_trait]
pub trait DnsService: Send + Sync + Debug {
    /// Fetch one page of the hosted zone listing
    async fn list_hosted_zones(&self, marker: Option<String>) -> AcmResult<Page<HostedZone>>;

    /// Fetch one page of the record sets in a zone
    async fn list_record_sets(
        &self,
        zone_id: &HostedZoneId,
        cursor: Option<RecordSetCursor>,
    ) -> AcmResult<Page<RecordSet, RecordSetCursor>>;

    /// Submit a batch of record set changes to a zone
    async fn change_record_sets(&self, zone_id: &HostedZoneId, batch: &ChangeBatch) -> AcmResult<()>;
}

/// Service clients bound to one region
#[derive(Debug, Clone)]
pub struct RegionalServices {
    pub certificate_authority: Arc<dyn CertificateAuthority>,
    pub dns: Arc<dyn DnsService>,
}

/// Builds service clients for a region
#[async_trait]
pub trait ServiceConnector: Send + Sync + Debug {
    async fn connect(&self, region: &Region) -> AcmResult<RegionalServices>;
}
