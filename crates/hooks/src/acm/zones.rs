//! DNS zone directory
//!
//! Resolves hosted zones by name and reads or changes record sets inside
//! them. Every listing is walked to the end so that a match on a later page
//! is never missed and duplicates are always noticed.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use stackhooks_common::{Fqdn, HostedZoneId};
use stackhooks_config::ZoneVisibility;
use tracing::{debug, info, trace};

use super::error::{AcmError, AcmResult};
use super::provider::DnsService;
use super::types::{ChangeBatch, HostedZone, Lookup, RecordAction, RecordSet};

/// How record sets are selected by name
#[derive(Debug, Clone)]
pub enum RecordMatcher {
    /// Exact record name, compared case-insensitively in absolute form
    Name(String),
    /// Regular expression applied to the record name as reported
    Pattern(Regex),
}

impl RecordMatcher {
    /// Build a matcher from optional parts; exactly one must be given
    pub fn from_parts(name: Option<&str>, pattern: Option<&str>) -> AcmResult<Self> {
        match (name, pattern) {
            (Some(name), None) => Ok(RecordMatcher::Name(name.to_string())),
            (None, Some(pattern)) => RecordMatcher::pattern(pattern),
            _ => Err(AcmError::InvalidArgument(
                "exactly one of a record name or a name pattern must be given".to_string(),
            )),
        }
    }

    fn pattern(pattern: &str) -> AcmResult<Self> {
        Regex::new(pattern)
            .map(RecordMatcher::Pattern)
            .map_err(|e| AcmError::InvalidArgument(format!("invalid record name pattern: {e}")))
    }

    pub fn matches(&self, record_name: &str) -> bool {
        match self {
            RecordMatcher::Name(name) => absolute(name).eq_ignore_ascii_case(&absolute(record_name)),
            RecordMatcher::Pattern(re) => re.is_match(record_name),
        }
    }
}

impl fmt::Display for RecordMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordMatcher::Name(name) => write!(f, "{}", name),
            RecordMatcher::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Hosted zone and record set lookups over a [`DnsService`]
#[derive(Debug, Clone)]
pub struct ZoneDirectory {
    dns: Arc<dyn DnsService>,
    visibility: ZoneVisibility,
}

impl ZoneDirectory {
    pub fn new(dns: Arc<dyn DnsService>, visibility: ZoneVisibility) -> Self {
        Self { dns, visibility }
    }

    /// Find the hosted zones named `domain` across every listing page
    pub async fn lookup_zone(&self, domain: &Fqdn) -> AcmResult<Lookup<HostedZone>> {
        let wanted = domain.absolute();
        let mut matches = Vec::new();
        let mut marker = None;
        let mut pages = 0usize;

        loop {
            let page = self.dns.list_hosted_zones(marker).await?;
            pages += 1;

            matches.extend(
                page.items
                    .into_iter()
                    .filter(|zone| zone.name.eq_ignore_ascii_case(&wanted))
                    .filter(|zone| self.visibility.admits(zone.private_zone)),
            );

            match page.next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        trace!(
            domain = %domain,
            visibility = %self.visibility,
            pages,
            matches = matches.len(),
            "Listed hosted zones"
        );
        Ok(Lookup::from_matches(matches))
    }

    /// Resolve the id of the single hosted zone named `domain`.
    ///
    /// Returns `None` when no zone carries the name and fails when several do.
    pub async fn resolve_zone_id(&self, domain: &Fqdn) -> AcmResult<Option<HostedZoneId>> {
        match self.lookup_zone(domain).await? {
            Lookup::Found(zone) => {
                debug!(domain = %domain, zone_id = %zone.id, "Resolved hosted zone");
                Ok(Some(zone.id))
            }
            Lookup::NotFound => {
                debug!(domain = %domain, "No hosted zone found");
                Ok(None)
            }
            Lookup::Ambiguous(zones) => Err(AcmError::MultipleZones {
                domain: domain.absolute(),
                zone_ids: zones.into_iter().map(|z| z.id.to_string()).collect(),
            }),
        }
    }

    /// Find record sets in the zone for `zone_domain` selected by `matcher`
    /// and, if given, by record type.
    ///
    /// A missing zone yields [`Lookup::NotFound`]. Several matches are
    /// returned as [`Lookup::Ambiguous`] for the caller to judge.
    pub async fn find_record_set(
        &self,
        zone_domain: &Fqdn,
        matcher: &RecordMatcher,
        record_type: Option<&str>,
    ) -> AcmResult<Lookup<RecordSet>> {
        let Some(zone_id) = self.resolve_zone_id(zone_domain).await? else {
            return Ok(Lookup::NotFound);
        };

        let mut matches = Vec::new();
        let mut cursor = None;

        loop {
            let page = self.dns.list_record_sets(&zone_id, cursor).await?;

            matches.extend(page.items.into_iter().filter(|record| {
                matcher.matches(&record.name)
                    && record_type.is_none_or(|t| record.record_type.eq_ignore_ascii_case(t))
            }));

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(
            zone_id = %zone_id,
            matcher = %matcher,
            matches = matches.len(),
            "Searched record sets"
        );
        Ok(Lookup::from_matches(matches))
    }

    /// Apply a single record set change in the zone for `zone_domain`
    pub async fn mutate_record_set(
        &self,
        record: &RecordSet,
        zone_domain: &Fqdn,
        action: RecordAction,
        comment: &str,
    ) -> AcmResult<()> {
        let zone_id = self
            .resolve_zone_id(zone_domain)
            .await?
            .ok_or_else(|| AcmError::ZoneNotFound {
                domain: zone_domain.absolute(),
            })?;

        let batch = ChangeBatch::single(action, record.clone(), comment);
        self.dns.change_record_sets(&zone_id, &batch).await?;

        info!(
            zone_id = %zone_id,
            action = %action,
            name = %record.name,
            record_type = %record.record_type,
            "Changed record set"
        );
        Ok(())
    }
}
