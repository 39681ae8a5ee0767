//! Hooks and resolvers invoked by the orchestration tool
//!
//! A hook performs a lifecycle action; a resolver looks a value up and
//! returns it as a string. Both are constructed explicitly by the caller.
//! [`RecordSetTool`] exposes the record set lookups and changes on their own.

mod acm_certificate;
mod error;
mod record_sets;
mod resolvers;

use async_trait::async_trait;
use stackhooks_config::ResolverArgs;

pub use acm_certificate::AcmCertificateHook;
pub use error::{HookError, HookResult};
pub use record_sets::{RecordQuery, RecordSetTool, MANUAL_CHANGE_COMMENT};
pub use resolvers::{AcmCertificateArnResolver, HostedZoneIdResolver};

/// A lifecycle action run against one configuration
#[async_trait]
pub trait Hook: Send + Sync {
    type Config: Send + Sync;
    type Output: Send;

    /// Name the orchestration tool knows the hook by
    fn name(&self) -> &'static str;

    async fn run(&self, config: &Self::Config) -> HookResult<Self::Output>;
}

/// A lookup returning a single string value
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Name the orchestration tool knows the resolver by
    fn name(&self) -> &'static str;

    /// Positional argument synopsis shown on misuse
    fn usage(&self) -> &'static str;

    /// Resolve the value, or the empty string when there is nothing to find
    async fn resolve(&self, args: &ResolverArgs) -> HookResult<String>;
}
