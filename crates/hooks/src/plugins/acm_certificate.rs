//! `acm_certificate` hook

use std::sync::Arc;

use async_trait::async_trait;
use stackhooks_config::{CertificateHookConfig, HookArguments};
use tracing::info;
use validator::Validate;

use super::{Hook, HookResult};
use crate::acm::{LifecycleController, PollPolicy, ReconcileOutcome, ServiceConnector};

/// Requests or deletes a certificate and its DNS validation record
#[derive(Debug, Clone)]
pub struct AcmCertificateHook {
    connector: Arc<dyn ServiceConnector>,
    poll: PollPolicy,
}

impl AcmCertificateHook {
    pub fn new(connector: Arc<dyn ServiceConnector>) -> Self {
        Self {
            connector,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Parse the keyword argument string and run
    pub async fn run_argument(&self, argument: &str) -> HookResult<ReconcileOutcome> {
        let args = HookArguments::parse(argument)?;
        let config = CertificateHookConfig::from_arguments(&args)?;
        self.run(&config).await
    }
}

#[async_trait]
impl Hook for AcmCertificateHook {
    type Config = CertificateHookConfig;
    type Output = ReconcileOutcome;

    fn name(&self) -> &'static str {
        "acm_certificate"
    }

    async fn run(&self, config: &CertificateHookConfig) -> HookResult<ReconcileOutcome> {
        config.validate().map_err(stackhooks_config::ConfigError::from)?;

        let services = self.connector.connect(&config.region).await?;
        let controller =
            LifecycleController::new(services, config.zone_visibility).with_poll_policy(self.poll);

        let outcome = controller.run(config).await?;
        info!(hook = self.name(), fqdn = %config.fqdn, "Hook completed");
        Ok(outcome)
    }
}
