//! Stackhooks - Main entry point
//!
//! Certificate lifecycle hooks and resolvers for stack orchestration.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use stackhooks::acm::{Lookup, RecordSet};
use stackhooks::{
    AcmCertificateArnResolver, AcmCertificateHook, AwsConnector, Hook, HookError,
    HostedZoneIdResolver, PollPolicy, RecordQuery, RecordSetTool, ReconcileOutcome,
};
use stackhooks_common::observability::init_tracing;
use stackhooks_common::{Fqdn, Region};
use stackhooks_config::{
    lint_config, CertificateAction, CertificateHookConfig, ConfigError, StackConfig, ZoneVisibility,
};

/// Exit status for arguments or configuration rejected before any remote call
const EXIT_CONFIG: u8 = 2;

/// Stackhooks - certificate lifecycle hooks for stack orchestration
#[derive(Parser, Debug)]
#[command(name = "stackhooks")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", env = "STACKHOOKS_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Seconds between issuance checks
    #[arg(long = "poll-interval", default_value_t = 10, global = true)]
    poll_interval: u64,

    /// Number of issuance checks before giving up for this run
    #[arg(long = "poll-attempts", default_value_t = 30, global = true)]
    poll_attempts: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Request or delete a certificate
    Certificate {
        #[arg(value_enum)]
        action: ActionArg,

        /// Certificate domain name
        #[arg(long)]
        fqdn: String,

        /// Domain whose hosted zone proves ownership
        #[arg(long = "validation-domain")]
        validation_domain: String,

        /// Region the certificate lives in
        #[arg(long, default_value = stackhooks_common::DEFAULT_REGION)]
        region: String,

        /// Subject alternative name (repeatable)
        #[arg(long = "san")]
        subject_alternative_names: Vec<String>,

        /// Hosted zones considered for DNS validation
        #[arg(long = "zone-visibility", value_enum, default_value_t = VisibilityArg::All)]
        zone_visibility: VisibilityArg,
    },
    /// Run a hook with its keyword argument string
    Hook {
        /// Hook name
        name: String,
        /// Arguments, e.g. "action=request cert_fqdn=... region=..."
        argument: String,
    },
    /// Reconcile every certificate in a configuration file
    Apply {
        #[arg(short = 'c', long = "config")]
        config: String,
    },
    /// Run a resolver and print its value
    Resolve {
        #[arg(value_enum)]
        resolver: ResolverArg,
        /// Positional arguments, e.g. "example.com us-west-2"
        argument: String,

        /// Hosted zones considered by hosted-zone-id
        #[arg(long = "zone-visibility", value_enum, default_value_t = VisibilityArg::All)]
        zone_visibility: VisibilityArg,
    },
    /// Find or change record sets in a hosted zone
    Record {
        #[command(subcommand)]
        command: RecordCommand,
    },
    /// Validate a configuration file and exit
    Test {
        #[arg(short = 'c', long = "config")]
        config: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    Request,
    Delete,
}

impl From<ActionArg> for CertificateAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Request => CertificateAction::Request,
            ActionArg::Delete => CertificateAction::Delete,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResolverArg {
    CertificateArn,
    HostedZoneId,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VisibilityArg {
    All,
    Public,
    Private,
}

impl From<VisibilityArg> for ZoneVisibility {
    fn from(visibility: VisibilityArg) -> Self {
        match visibility {
            VisibilityArg::All => ZoneVisibility::All,
            VisibilityArg::Public => ZoneVisibility::Public,
            VisibilityArg::Private => ZoneVisibility::Private,
        }
    }
}

/// Zone selection shared by the record subcommands
#[derive(clap::Args, Debug)]
struct ZoneArgs {
    /// Domain of the hosted zone
    #[arg(long)]
    zone: String,

    #[arg(long, default_value = stackhooks_common::DEFAULT_REGION)]
    region: String,

    #[arg(long = "zone-visibility", value_enum, default_value_t = VisibilityArg::All)]
    zone_visibility: VisibilityArg,
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
    /// Print matching record sets: null, one object, or a list
    Find {
        #[command(flatten)]
        zone: ZoneArgs,

        /// Exact record name
        #[arg(long, conflicts_with = "pattern", required_unless_present = "pattern")]
        name: Option<String>,

        /// Regular expression over record names
        #[arg(long)]
        pattern: Option<String>,

        /// Record type filter, e.g. CNAME
        #[arg(long = "type")]
        record_type: Option<String>,
    },
    /// Apply one CREATE, DELETE or UPSERT change
    Change {
        /// CREATE, DELETE or UPSERT
        action: String,

        #[command(flatten)]
        zone: ZoneArgs,

        #[arg(long)]
        name: String,

        #[arg(long = "type")]
        record_type: String,

        #[arg(long)]
        ttl: Option<i64>,

        /// Record value (repeatable)
        #[arg(long = "value", required = true)]
        values: Vec<String>,

        #[arg(long)]
        comment: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("stackhooks: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = error_kind(&e);
            error!(error = %format!("{e:#}"), kind, "stackhooks failed");
            if kind == "config" {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Failure class of an error chain
fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(hook) = err.downcast_ref::<HookError>() {
        hook.kind()
    } else if err.downcast_ref::<ConfigError>().is_some() {
        "config"
    } else {
        "internal"
    }
}

async fn run(cli: Cli) -> Result<()> {
    let poll = PollPolicy {
        interval: Duration::from_secs(cli.poll_interval),
        max_attempts: cli.poll_attempts,
    };
    let connector = Arc::new(AwsConnector);
    let hook = AcmCertificateHook::new(connector.clone()).with_poll_policy(poll);

    match cli.command {
        Commands::Certificate {
            action,
            fqdn,
            validation_domain,
            region,
            subject_alternative_names,
            zone_visibility,
        } => {
            let config = CertificateHookConfig {
                action: action.into(),
                fqdn: Fqdn::new(fqdn),
                validation_domain: Fqdn::new(validation_domain),
                region: Region::new(region),
                subject_alternative_names: subject_alternative_names.iter().map(Fqdn::new).collect(),
                zone_visibility: zone_visibility.into(),
            };
            let outcome = hook.run(&config).await.context("Certificate hook failed")?;
            print_outcome(&outcome)
        }
        Commands::Hook { name, argument } => {
            if name != hook.name() {
                bail!("unknown hook '{}' (available: {})", name, hook.name());
            }
            let outcome = hook
                .run_argument(&argument)
                .await
                .with_context(|| format!("Hook '{}' failed", name))?;
            print_outcome(&outcome)
        }
        Commands::Apply { config } => apply(&hook, &config).await,
        Commands::Resolve {
            resolver,
            argument,
            zone_visibility,
        } => {
            let value = match resolver {
                ResolverArg::CertificateArn => {
                    AcmCertificateArnResolver::new(connector)
                        .resolve_argument(&argument)
                        .await
                }
                ResolverArg::HostedZoneId => {
                    HostedZoneIdResolver::new(connector)
                        .with_visibility(zone_visibility.into())
                        .resolve_argument(&argument)
                        .await
                }
            }
            .context("Resolver failed")?;
            println!("{value}");
            Ok(())
        }
        Commands::Record { command } => record(RecordSetTool::new(connector), command).await,
        Commands::Test { config } => test_config(&config),
    }
}

async fn record(tool: RecordSetTool, command: RecordCommand) -> Result<()> {
    match command {
        RecordCommand::Find {
            zone,
            name,
            pattern,
            record_type,
        } => {
            let query = RecordQuery {
                zone_domain: Fqdn::new(&zone.zone),
                region: Region::new(&zone.region),
                name,
                pattern,
                record_type,
            };
            let lookup = tool
                .with_visibility(zone.zone_visibility.into())
                .find(&query)
                .await
                .context("Record set lookup failed")?;
            let json = match lookup {
                Lookup::NotFound => serde_json::Value::Null,
                Lookup::Found(record) => serde_json::to_value(record)?,
                Lookup::Ambiguous(records) => serde_json::to_value(records)?,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
        RecordCommand::Change {
            action,
            zone,
            name,
            record_type,
            ttl,
            values,
            comment,
        } => {
            let record = RecordSet {
                name,
                record_type,
                ttl,
                values,
            };
            let action = tool
                .with_visibility(zone.zone_visibility.into())
                .change(
                    &action,
                    &record,
                    &Fqdn::new(&zone.zone),
                    &Region::new(&zone.region),
                    comment.as_deref(),
                )
                .await
                .context("Record set change failed")?;
            info!(action = %action, name = %record.name, zone = %zone.zone, "Record set changed");
            Ok(())
        }
    }
}

/// Run every certificate block in order, stopping at the first failure
async fn apply(hook: &AcmCertificateHook, config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;

    info!(
        path = %config_path,
        certificates = config.certificates.len(),
        "Applying configuration"
    );

    for certificate in &config.certificates {
        let outcome = hook
            .run(certificate)
            .await
            .with_context(|| format!("Certificate '{}' failed", certificate.fqdn))?;
        print_outcome(&outcome)?;
    }

    Ok(())
}

/// Test configuration file and exit
fn test_config(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;

    info!("Configuration test successful:");
    info!("  - {} certificate(s)", config.certificates.len());

    println!("stackhooks: configuration file {} test is successful", config_path);
    Ok(())
}

fn load_config(config_path: &str) -> Result<StackConfig> {
    let config = StackConfig::from_file(config_path).context("Failed to load configuration file")?;

    let lint = lint_config(&config);
    if lint.has_warnings() {
        warn!(path = %config_path, count = lint.warnings.len(), "Configuration has warnings");
        for warning in &lint.warnings {
            warn!("{}", warning);
        }
    }
    if !lint.is_valid() {
        for error in &lint.errors {
            error!("{}", error);
        }
        bail!(
            "Configuration validation failed with {} error(s)",
            lint.errors.len()
        );
    }

    Ok(config)
}

fn print_outcome(outcome: &ReconcileOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
    println!("{json}");
    Ok(())
}
