//! Certificate hook KDL parsing.

use stackhooks_common::{Fqdn, Region};
use tracing::trace;

use crate::certificate::{CertificateAction, CertificateHookConfig, ZoneVisibility};
use crate::error::{ConfigError, ConfigResult};

use super::helpers::{get_first_arg_string, get_string_entry, get_string_list_entry};

/// Parse a `certificate "<fqdn>" { ... }` block
pub fn parse_certificate(node: &kdl::KdlNode) -> ConfigResult<CertificateHookConfig> {
    let fqdn = get_first_arg_string(node).ok_or_else(|| {
        ConfigError::Parse(
            "certificate requires a domain name argument, e.g., certificate \"www.example.com\" { ... }"
                .to_string(),
        )
    })?;

    trace!(fqdn = %fqdn, "Parsing certificate block");

    let action = get_string_entry(node, "action");
    let validation_domain = get_string_entry(node, "validation-domain");
    let region = get_string_entry(node, "region");

    let missing: Vec<String> = [
        ("action", action.is_none()),
        ("validation-domain", validation_domain.is_none()),
        ("region", region.is_none()),
    ]
    .into_iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| name.to_string())
    .collect();

    if !missing.is_empty() {
        return Err(ConfigError::Parse(format!(
            "certificate '{}' is missing required field(s): {}",
            fqdn,
            missing.join(", ")
        )));
    }

    let action: CertificateAction = action.unwrap_or_default().parse()?;
    let zone_visibility: ZoneVisibility = get_string_entry(node, "zone-visibility")
        .map(|value| value.parse::<ZoneVisibility>())
        .transpose()?
        .unwrap_or_default();

    let config = CertificateHookConfig {
        action,
        fqdn: Fqdn::new(&fqdn),
        validation_domain: Fqdn::new(validation_domain.unwrap_or_default()),
        region: Region::new(region.unwrap_or_default()),
        subject_alternative_names: get_string_list_entry(node, "subject-alternative-names")
            .iter()
            .map(Fqdn::new)
            .collect(),
        zone_visibility,
    };

    trace!(
        fqdn = %config.fqdn,
        action = %config.action,
        san_count = config.subject_alternative_names.len(),
        "Parsed certificate block"
    );

    Ok(config)
}
