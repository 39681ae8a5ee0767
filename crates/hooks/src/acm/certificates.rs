//! Certificate directory
//!
//! Finds certificates by FQDN across the paginated listing and wraps the
//! certificate authority's read, request and delete operations.

use std::sync::Arc;

use stackhooks_common::{CertificateArn, Fqdn};
use tracing::{debug, info, trace};

use super::error::{AcmError, AcmResult};
use super::provider::CertificateAuthority;
use super::types::{Certificate, CertificateRequest, Lookup};

/// Certificate lookups over a [`CertificateAuthority`]
#[derive(Debug, Clone)]
pub struct CertificateDirectory {
    authority: Arc<dyn CertificateAuthority>,
}

impl CertificateDirectory {
    pub fn new(authority: Arc<dyn CertificateAuthority>) -> Self {
        Self { authority }
    }

    /// Collect the ARNs of every certificate whose domain is `fqdn`
    pub async fn lookup_certificate(&self, fqdn: &Fqdn) -> AcmResult<Lookup<CertificateArn>> {
        let mut matches = Vec::new();
        let mut next_token = None;

        loop {
            let page = self.authority.list_certificates(next_token).await?;

            matches.extend(
                page.items
                    .into_iter()
                    .filter(|summary| Fqdn::new(&summary.domain_name) == *fqdn)
                    .map(|summary| summary.arn),
            );

            match page.next {
                Some(next) => next_token = Some(next),
                None => break,
            }
        }

        trace!(fqdn = %fqdn, matches = matches.len(), "Listed certificates");
        Ok(Lookup::from_matches(matches))
    }

    /// ARN of the single certificate for `fqdn`, if any
    pub async fn find_certificate_arn(&self, fqdn: &Fqdn) -> AcmResult<Option<CertificateArn>> {
        match self.lookup_certificate(fqdn).await? {
            Lookup::Found(arn) => Ok(Some(arn)),
            Lookup::NotFound => Ok(None),
            Lookup::Ambiguous(arns) => Err(AcmError::MultipleCertificates {
                fqdn: fqdn.to_string(),
                arns: arns.into_iter().map(CertificateArn::into_string).collect(),
            }),
        }
    }

    /// Full detail of the single certificate for `fqdn`, if any
    pub async fn get_certificate(&self, fqdn: &Fqdn) -> AcmResult<Option<Certificate>> {
        match self.find_certificate_arn(fqdn).await? {
            Some(arn) => self.describe(&arn).await.map(Some),
            None => {
                debug!(fqdn = %fqdn, "No certificate found");
                Ok(None)
            }
        }
    }

    /// Full detail of the certificate `arn`
    pub async fn describe(&self, arn: &CertificateArn) -> AcmResult<Certificate> {
        self.authority.describe_certificate(arn).await
    }

    pub async fn request_certificate(&self, request: &CertificateRequest) -> AcmResult<CertificateArn> {
        let arn = self.authority.request_certificate(request).await?;
        info!(
            fqdn = %request.domain_name,
            arn = %arn,
            method = %request.validation_method,
            "Requested certificate"
        );
        Ok(arn)
    }

    pub async fn delete_certificate(&self, arn: &CertificateArn) -> AcmResult<()> {
        self.authority.delete_certificate(arn).await?;
        info!(arn = %arn, "Deleted certificate");
        Ok(())
    }
}
