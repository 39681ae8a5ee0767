//! Configuration loading and validation for stackhooks
//!
//! Two ways in:
//!
//! - [`HookArguments`] / [`ResolverArgs`] parse the single argument string the
//!   orchestration tool passes to a plugin.
//! - [`StackConfig`] loads a file of certificate blocks (KDL, TOML or JSON).
//!
//! Either way the result is a [`CertificateHookConfig`] that has been
//! validated before any remote call is made.

pub mod arguments;
pub mod certificate;
pub mod error;
pub mod kdl;
pub mod validate;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

pub use arguments::{HookArguments, ResolverArgs};
pub use certificate::{CertificateAction, CertificateHookConfig, ZoneVisibility};
pub use error::{ConfigError, ConfigResult};
pub use validate::{lint::lint_config, ValidationResult};

/// A stack's worth of certificate hook blocks, applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default, rename = "certificate")]
    pub certificates: Vec<CertificateHookConfig>,
}

impl StackConfig {
    /// Load configuration from a file, picking the format by extension.
    ///
    /// Files without an extension are read as KDL.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("kdl");

        debug!(path = %path.display(), format = extension, "Loading stack configuration");

        let config = match extension {
            "kdl" => Self::from_kdl(&content),
            "json" => Self::from_json(&content),
            "toml" => Self::from_toml(&content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }?;

        info!(
            path = %path.display(),
            certificates = config.certificates.len(),
            "Loaded stack configuration"
        );

        Ok(config)
    }

    /// Parse configuration from KDL text
    pub fn from_kdl(content: &str) -> ConfigResult<Self> {
        kdl::parse_kdl(content)
    }

    /// Parse configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate every certificate block's fields
    pub fn validate(&self) -> ConfigResult<()> {
        for cert in &self.certificates {
            cert.validate()?;
        }
        Ok(())
    }
}
