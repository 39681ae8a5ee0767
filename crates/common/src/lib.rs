//! Common types and utilities shared by the stackhooks crates.

pub mod ids;
pub mod observability;

pub use ids::{CertificateArn, Fqdn, HostedZoneId, Region, DEFAULT_REGION};
