//! Route 53 backend

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext};
use aws_sdk_route53::types as r53;
use aws_sdk_route53::Client;
use stackhooks_common::HostedZoneId;

use crate::acm::error::{AcmError, AcmResult};
use crate::acm::provider::DnsService;
use crate::acm::types::{ChangeBatch, HostedZone, Page, RecordAction, RecordSet, RecordSetCursor};

const SERVICE: &str = "route53";

#[derive(Debug, Clone)]
pub struct Route53Service {
    client: Client,
}

impl Route53Service {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl DnsService for Route53Service {
    async fn list_hosted_zones(&self, marker: Option<String>) -> AcmResult<Page<HostedZone>> {
        let output = self
            .client
            .list_hosted_zones()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| AcmError::service(SERVICE, "ListHostedZones", DisplayErrorContext(&e)))?;

        let items = output
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone {
                id: HostedZoneId::new(zone.id()),
                name: zone.name().to_string(),
                private_zone: zone.config().is_some_and(|config| config.private_zone()),
            })
            .collect();

        let next = if output.is_truncated() {
            output.next_marker().map(str::to_string)
        } else {
            None
        };

        Ok(Page::new(items, next))
    }

    async fn list_record_sets(
        &self,
        zone_id: &HostedZoneId,
        cursor: Option<RecordSetCursor>,
    ) -> AcmResult<Page<RecordSet, RecordSetCursor>> {
        let mut call = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id.as_str());

        if let Some(cursor) = cursor {
            call = call
                .start_record_name(cursor.name)
                .start_record_type(r53::RrType::from(cursor.record_type.as_str()))
                .set_start_record_identifier(cursor.identifier);
        }

        let output = call.send().await.map_err(|e| {
            AcmError::service(SERVICE, "ListResourceRecordSets", DisplayErrorContext(&e))
        })?;

        let items = output
            .resource_record_sets()
            .iter()
            .map(|set| RecordSet {
                name: set.name().to_string(),
                record_type: set.r#type().as_str().to_string(),
                ttl: set.ttl(),
                values: set
                    .resource_records()
                    .iter()
                    .map(|record| record.value().to_string())
                    .collect(),
            })
            .collect();

        let next = match (output.is_truncated(), output.next_record_name(), output.next_record_type()) {
            (true, Some(name), Some(record_type)) => Some(RecordSetCursor {
                name: name.to_string(),
                record_type: record_type.as_str().to_string(),
                identifier: output.next_record_identifier().map(str::to_string),
            }),
            _ => None,
        };

        Ok(Page::new(items, next))
    }

    async fn change_record_sets(&self, zone_id: &HostedZoneId, batch: &ChangeBatch) -> AcmResult<()> {
        let batch = sdk_change_batch(batch).map_err(|e| AcmError::InvalidArgument(e.to_string()))?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id.as_str())
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                AcmError::service(SERVICE, "ChangeResourceRecordSets", DisplayErrorContext(&e))
            })?;

        Ok(())
    }
}

fn sdk_change_batch(batch: &ChangeBatch) -> Result<r53::ChangeBatch, BuildError> {
    let changes = batch
        .changes
        .iter()
        .map(|change| {
            let records = change
                .record_set
                .values
                .iter()
                .map(|value| r53::ResourceRecord::builder().value(value).build())
                .collect::<Result<Vec<_>, _>>()?;

            let record_set = r53::ResourceRecordSet::builder()
                .name(&change.record_set.name)
                .r#type(r53::RrType::from(change.record_set.record_type.as_str()))
                .set_ttl(change.record_set.ttl)
                .set_resource_records(Some(records))
                .build()?;

            r53::Change::builder()
                .action(sdk_change_action(change.action))
                .resource_record_set(record_set)
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;

    r53::ChangeBatch::builder()
        .comment(&batch.comment)
        .set_changes(Some(changes))
        .build()
}

fn sdk_change_action(action: RecordAction) -> r53::ChangeAction {
    match action {
        RecordAction::Create => r53::ChangeAction::Create,
        RecordAction::Delete => r53::ChangeAction::Delete,
        RecordAction::Upsert => r53::ChangeAction::Upsert,
    }
}
