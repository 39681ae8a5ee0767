//! Stackhooks Library
//!
//! Certificate lifecycle hooks and resolvers for stack orchestration.
//!
//! This library provides:
//!
//! - **Certificate reconciliation**: request, validate, replace and delete
//!   AWS Certificate Manager certificates
//! - **DNS validation**: Route 53 zone lookups and validation record upkeep
//! - **Hooks and resolvers**: the entry points the orchestration tool calls
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stackhooks::{AcmCertificateHook, AwsConnector};
//!
//! let hook = AcmCertificateHook::new(Arc::new(AwsConnector));
//! let outcome = hook
//!     .run_argument("action=request cert_fqdn=demo.example.com validation_domain=example.com region=us-east-1")
//!     .await?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod acm;
pub mod plugins;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Reconciliation core
pub use acm::{
    AcmError, AcmResult, CertificateDirectory, LifecycleController, PollPolicy, ReconcileOutcome,
    ValidationCoordinator, ZoneDirectory,
};

// AWS backends
pub use acm::aws::{AcmService, AwsConnector, Route53Service};

// Hooks and resolvers
pub use plugins::{
    AcmCertificateArnResolver, AcmCertificateHook, Hook, HookError, HookResult,
    HostedZoneIdResolver, RecordQuery, RecordSetTool, Resolver,
};
