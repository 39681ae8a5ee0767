//! Logging setup shared by the stackhooks binaries.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "STACKHOOKS_LOG_FORMAT";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line human-readable output
    Compact,
}

impl LogFormat {
    /// Parse a format name, falling back to [`LogFormat::Pretty`] for
    /// anything unrecognised.
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }

    /// Read the format from [`LOG_FORMAT_ENV`].
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::from_str_loose(&v))
            .unwrap_or_default()
    }
}

/// Initialize the tracing/logging subsystem
///
/// Logs go to stderr so stdout stays free for hook output. `RUST_LOG` takes
/// precedence over `default_level` when set.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let format = LogFormat::from_env();

    let json_layer = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    let pretty_layer = (format == LogFormat::Pretty)
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    let compact_layer = (format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(compact_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(format = ?format, "Tracing initialized");
    Ok(())
}
