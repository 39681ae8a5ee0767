//! Value resolvers

use std::sync::Arc;

use async_trait::async_trait;
use stackhooks_common::{Fqdn, Region};
use stackhooks_config::{ResolverArgs, ZoneVisibility};
use tracing::debug;

use super::{HookResult, Resolver};
use crate::acm::{CertificateDirectory, ServiceConnector, ZoneDirectory};

/// ARN of the certificate for an FQDN
#[derive(Debug, Clone)]
pub struct AcmCertificateArnResolver {
    connector: Arc<dyn ServiceConnector>,
}

impl AcmCertificateArnResolver {
    pub fn new(connector: Arc<dyn ServiceConnector>) -> Self {
        Self { connector }
    }

    /// Parse `fqdn [region]` and resolve
    pub async fn resolve_argument(&self, argument: &str) -> HookResult<String> {
        let args = ResolverArgs::parse(argument, self.usage(), &Region::default())?;
        self.resolve(&args).await
    }
}

#[async_trait]
impl Resolver for AcmCertificateArnResolver {
    fn name(&self) -> &'static str {
        "acm_certificate_arn"
    }

    fn usage(&self) -> &'static str {
        "cert_fqdn [region]"
    }

    async fn resolve(&self, args: &ResolverArgs) -> HookResult<String> {
        let services = self.connector.connect(&args.region).await?;
        let certificates = CertificateDirectory::new(services.certificate_authority);

        let arn = certificates
            .find_certificate_arn(&Fqdn::new(&args.name))
            .await?
            .map(|arn| arn.into_string())
            .unwrap_or_default();

        debug!(resolver = self.name(), name = %args.name, value = %arn, "Resolved");
        Ok(arn)
    }
}

/// Id of the hosted zone for a domain
#[derive(Debug, Clone)]
pub struct HostedZoneIdResolver {
    connector: Arc<dyn ServiceConnector>,
    visibility: ZoneVisibility,
}

impl HostedZoneIdResolver {
    pub fn new(connector: Arc<dyn ServiceConnector>) -> Self {
        Self {
            connector,
            visibility: ZoneVisibility::default(),
        }
    }

    /// Restrict resolution to public or private zones
    pub fn with_visibility(mut self, visibility: ZoneVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Parse `domain_name [region]` and resolve
    pub async fn resolve_argument(&self, argument: &str) -> HookResult<String> {
        let args = ResolverArgs::parse(argument, self.usage(), &Region::default())?;
        self.resolve(&args).await
    }
}

#[async_trait]
impl Resolver for HostedZoneIdResolver {
    fn name(&self) -> &'static str {
        "hosted_zone_id"
    }

    fn usage(&self) -> &'static str {
        "domain_name [region]"
    }

    async fn resolve(&self, args: &ResolverArgs) -> HookResult<String> {
        let services = self.connector.connect(&args.region).await?;
        let zones = ZoneDirectory::new(services.dns, self.visibility);

        let zone_id = zones
            .resolve_zone_id(&Fqdn::new(&args.name))
            .await?
            .map(|id| id.to_string())
            .unwrap_or_default();

        debug!(resolver = self.name(), name = %args.name, value = %zone_id, "Resolved");
        Ok(zone_id)
    }
}
