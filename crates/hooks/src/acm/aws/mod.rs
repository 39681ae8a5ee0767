//! AWS-backed service implementations
//!
//! [`AcmService`] fronts AWS Certificate Manager and [`Route53Service`] fronts
//! Route 53. Both are bound to the region of the SDK configuration they are
//! built from.

mod certificate_manager;
mod route53;

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use stackhooks_common::Region;
use tracing::debug;

use super::error::AcmResult;
use super::provider::{RegionalServices, ServiceConnector};

pub use certificate_manager::AcmService;
pub use route53::Route53Service;

/// Load shared SDK configuration for a region from the default credential chain
pub async fn load_sdk_config(region: &Region) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(region.as_str().to_string()))
        .load()
        .await
}

/// Connects to AWS using the default credential chain
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsConnector;

#[async_trait]
impl ServiceConnector for AwsConnector {
    async fn connect(&self, region: &Region) -> AcmResult<RegionalServices> {
        let sdk_config = load_sdk_config(region).await;
        debug!(region = %region, "Loaded AWS configuration");

        Ok(RegionalServices {
            certificate_authority: Arc::new(AcmService::new(&sdk_config)),
            dns: Arc::new(Route53Service::new(&sdk_config)),
        })
    }
}
