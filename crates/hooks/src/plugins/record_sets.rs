//! Record set lookups and changes by hand

use std::sync::Arc;

use stackhooks_common::{Fqdn, Region};
use stackhooks_config::ZoneVisibility;
use tracing::debug;

use super::HookResult;
use crate::acm::{Lookup, RecordAction, RecordMatcher, RecordSet, ServiceConnector, ZoneDirectory};

/// Comment attached to changes made through [`RecordSetTool::change`]
pub const MANUAL_CHANGE_COMMENT: &str = "stackhooks record change";

/// Record sets to look for in one zone
#[derive(Debug, Clone)]
pub struct RecordQuery {
    pub zone_domain: Fqdn,
    pub region: Region,
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub record_type: Option<String>,
}

/// Finds and changes record sets in the zone for a domain
#[derive(Debug, Clone)]
pub struct RecordSetTool {
    connector: Arc<dyn ServiceConnector>,
    visibility: ZoneVisibility,
}

impl RecordSetTool {
    pub fn new(connector: Arc<dyn ServiceConnector>) -> Self {
        Self {
            connector,
            visibility: ZoneVisibility::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: ZoneVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Record sets matching the query; a missing zone is not found
    pub async fn find(&self, query: &RecordQuery) -> HookResult<Lookup<RecordSet>> {
        let matcher = RecordMatcher::from_parts(query.name.as_deref(), query.pattern.as_deref())?;

        let zones = self.zones(&query.region).await?;
        let lookup = zones
            .find_record_set(&query.zone_domain, &matcher, query.record_type.as_deref())
            .await?;

        debug!(zone = %query.zone_domain, matcher = %matcher, "Record set lookup finished");
        Ok(lookup)
    }

    /// Apply `action` (CREATE, DELETE or UPSERT) to one record set.
    ///
    /// The action is checked before any remote call.
    pub async fn change(
        &self,
        action: &str,
        record: &RecordSet,
        zone_domain: &Fqdn,
        region: &Region,
        comment: Option<&str>,
    ) -> HookResult<RecordAction> {
        let action: RecordAction = action.parse()?;

        let zones = self.zones(region).await?;
        zones
            .mutate_record_set(
                record,
                zone_domain,
                action,
                comment.unwrap_or(MANUAL_CHANGE_COMMENT),
            )
            .await?;
        Ok(action)
    }

    async fn zones(&self, region: &Region) -> HookResult<ZoneDirectory> {
        let services = self.connector.connect(region).await?;
        Ok(ZoneDirectory::new(services.dns, self.visibility))
    }
}
