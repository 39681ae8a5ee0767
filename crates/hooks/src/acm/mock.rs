//! In-memory service doubles used by unit tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use stackhooks_common::{CertificateArn, Fqdn, HostedZoneId, Region};

use super::error::{AcmError, AcmResult};
use super::provider::{CertificateAuthority, DnsService, RegionalServices, ServiceConnector};
use super::types::{
    Certificate, CertificateRequest, CertificateStatus, CertificateSummary, ChangeBatch,
    DomainValidation, HostedZone, Page, RecordAction, RecordSet, RecordSetCursor, ResourceRecord,
    ValidationMethod,
};

/// Call made against [`MockCertificateAuthority`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaCall {
    List(Option<String>),
    Describe(CertificateArn),
    Request(CertificateRequest),
    Delete(CertificateArn),
    ResendEmail {
        arn: CertificateArn,
        domain: String,
        validation_domain: String,
    },
}

impl CaCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            CaCall::Request(_) | CaCall::Delete(_) | CaCall::ResendEmail { .. }
        )
    }
}

/// What a newly requested certificate does while being polled
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuanceScript {
    /// Describe count after which the DNS challenge record appears
    pub record_after: Option<u32>,
    /// Describe count after which the certificate is issued
    pub issue_after: Option<u32>,
}

#[derive(Debug, Default)]
struct CaState {
    certificates: Vec<Certificate>,
    describes: HashMap<String, u32>,
    calls: Vec<CaCall>,
    next_id: u32,
}

/// Certificate authority double with paged listings and scripted issuance
#[derive(Debug)]
pub struct MockCertificateAuthority {
    state: Mutex<CaState>,
    page_size: usize,
    script: IssuanceScript,
}

impl Default for MockCertificateAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCertificateAuthority {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CaState::default()),
            page_size: 2,
            script: IssuanceScript::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_script(mut self, script: IssuanceScript) -> Self {
        self.script = script;
        self
    }

    pub fn with_certificate(self, certificate: Certificate) -> Self {
        self.state.lock().certificates.push(certificate);
        self
    }

    pub fn calls(&self) -> Vec<CaCall> {
        self.state.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<CaCall> {
        self.calls().into_iter().filter(CaCall::is_mutation).collect()
    }

    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, CaCall::Describe(_)))
            .count()
    }

    pub fn certificates(&self) -> Vec<Certificate> {
        self.state.lock().certificates.clone()
    }
}

#[async_trait]
impl CertificateAuthority for MockCertificateAuthority {
    async fn list_certificates(
        &self,
        next_token: Option<String>,
    ) -> AcmResult<Page<CertificateSummary>> {
        let mut state = self.state.lock();
        state.calls.push(CaCall::List(next_token.clone()));

        let start = parse_offset(next_token.as_deref())?;
        let end = (start + self.page_size).min(state.certificates.len());
        let items = state.certificates[start.min(end)..end]
            .iter()
            .map(|cert| CertificateSummary {
                arn: cert.arn.clone(),
                domain_name: cert.domain_name.to_string(),
            })
            .collect();
        let next = (end < state.certificates.len()).then(|| end.to_string());

        Ok(Page::new(items, next))
    }

    async fn describe_certificate(&self, arn: &CertificateArn) -> AcmResult<Certificate> {
        let mut state = self.state.lock();
        state.calls.push(CaCall::Describe(arn.clone()));

        let count = {
            let entry = state.describes.entry(arn.to_string()).or_default();
            *entry += 1;
            *entry
        };
        let script = self.script;

        let cert = state
            .certificates
            .iter_mut()
            .find(|cert| &cert.arn == arn)
            .ok_or_else(|| AcmError::service("acm", "DescribeCertificate", "ResourceNotFoundException"))?;

        if script.record_after.is_some_and(|after| count >= after) {
            if let Some(option) = cert.domain_validation_options.first_mut() {
                if option.validation_method == Some(ValidationMethod::Dns)
                    && option.resource_record.is_none()
                {
                    option.resource_record = Some(challenge_record(&cert.domain_name));
                }
            }
        }
        if script.issue_after.is_some_and(|after| count >= after) {
            cert.status = CertificateStatus::Issued;
        }

        Ok(cert.clone())
    }

    async fn request_certificate(&self, request: &CertificateRequest) -> AcmResult<CertificateArn> {
        let mut state = self.state.lock();
        state.calls.push(CaCall::Request(request.clone()));
        state.next_id += 1;

        let arn = test_arn(&format!("requested-{}", state.next_id));
        let mut cert = test_certificate(
            arn.as_str(),
            request.domain_name.as_str(),
            CertificateStatus::PendingValidation,
        );
        cert.subject_alternative_names = request.subject_alternative_names.clone();
        cert.domain_validation_options = vec![pending_validation(
            request.domain_name.as_str(),
            request.validation_method,
        )];
        state.certificates.push(cert);

        Ok(arn)
    }

    async fn delete_certificate(&self, arn: &CertificateArn) -> AcmResult<()> {
        let mut state = self.state.lock();
        state.calls.push(CaCall::Delete(arn.clone()));
        state.certificates.retain(|cert| &cert.arn != arn);
        Ok(())
    }

    async fn resend_validation_email(
        &self,
        arn: &CertificateArn,
        domain: &str,
        validation_domain: &str,
    ) -> AcmResult<()> {
        self.state.lock().calls.push(CaCall::ResendEmail {
            arn: arn.clone(),
            domain: domain.to_string(),
            validation_domain: validation_domain.to_string(),
        });
        Ok(())
    }
}

/// Call made against [`MockDnsService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsCall {
    ListZones(Option<String>),
    ListRecords(HostedZoneId),
    Change(HostedZoneId, ChangeBatch),
}

#[derive(Debug, Default)]
struct DnsState {
    zones: Vec<HostedZone>,
    records: HashMap<HostedZoneId, Vec<RecordSet>>,
    calls: Vec<DnsCall>,
}

/// DNS service double with paged listings that applies record changes
#[derive(Debug)]
pub struct MockDnsService {
    state: Mutex<DnsState>,
    page_size: usize,
}

impl Default for MockDnsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDnsService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DnsState::default()),
            page_size: 2,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().zones.push(HostedZone {
            id: HostedZoneId::new(id),
            name: name.to_string(),
            private_zone: false,
        });
        self
    }

    pub fn with_private_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().zones.push(HostedZone {
            id: HostedZoneId::new(id),
            name: name.to_string(),
            private_zone: true,
        });
        self
    }

    pub fn with_record(self, zone_id: &str, record: RecordSet) -> Self {
        self.state
            .lock()
            .records
            .entry(HostedZoneId::new(zone_id))
            .or_default()
            .push(record);
        self
    }

    pub fn calls(&self) -> Vec<DnsCall> {
        self.state.lock().calls.clone()
    }

    pub fn changes(&self) -> Vec<(HostedZoneId, ChangeBatch)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DnsCall::Change(zone, batch) => Some((zone, batch)),
                _ => None,
            })
            .collect()
    }

    pub fn records(&self, zone_id: &str) -> Vec<RecordSet> {
        self.state
            .lock()
            .records
            .get(&HostedZoneId::new(zone_id))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DnsService for MockDnsService {
    async fn list_hosted_zones(&self, marker: Option<String>) -> AcmResult<Page<HostedZone>> {
        let mut state = self.state.lock();
        state.calls.push(DnsCall::ListZones(marker.clone()));

        let start = parse_offset(marker.as_deref())?;
        let end = (start + self.page_size).min(state.zones.len());
        let items = state.zones[start.min(end)..end].to_vec();
        let next = (end < state.zones.len()).then(|| end.to_string());

        Ok(Page::new(items, next))
    }

    async fn list_record_sets(
        &self,
        zone_id: &HostedZoneId,
        cursor: Option<RecordSetCursor>,
    ) -> AcmResult<Page<RecordSet, RecordSetCursor>> {
        let mut state = self.state.lock();
        state.calls.push(DnsCall::ListRecords(zone_id.clone()));

        let records = state.records.get(zone_id).cloned().unwrap_or_default();
        let start = match cursor {
            Some(cursor) => records
                .iter()
                .position(|r| r.name == cursor.name && r.record_type == cursor.record_type)
                .unwrap_or(records.len()),
            None => 0,
        };
        let end = (start + self.page_size).min(records.len());
        let next = records.get(end).map(|record| RecordSetCursor {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            identifier: None,
        });

        Ok(Page::new(records[start..end].to_vec(), next))
    }

    async fn change_record_sets(&self, zone_id: &HostedZoneId, batch: &ChangeBatch) -> AcmResult<()> {
        let mut state = self.state.lock();
        state.calls.push(DnsCall::Change(zone_id.clone(), batch.clone()));

        let records = state.records.entry(zone_id.clone()).or_default();
        for change in &batch.changes {
            let set = &change.record_set;
            let existing = records
                .iter()
                .position(|r| r.name == set.name && r.record_type == set.record_type);

            match (change.action, existing) {
                (RecordAction::Create, Some(_)) => {
                    return Err(AcmError::service("route53", "ChangeResourceRecordSets", "record already exists"));
                }
                (RecordAction::Delete, None) => {
                    return Err(AcmError::service("route53", "ChangeResourceRecordSets", "record not found"));
                }
                (RecordAction::Delete, Some(index)) => {
                    records.remove(index);
                }
                (RecordAction::Upsert, Some(index)) => {
                    records[index] = set.clone();
                }
                (RecordAction::Create | RecordAction::Upsert, None) => {
                    records.push(set.clone());
                }
            }
        }

        Ok(())
    }
}

/// Connector handing out the same pair of doubles for every region
#[derive(Debug, Clone)]
pub struct MockConnector {
    pub certificate_authority: Arc<MockCertificateAuthority>,
    pub dns: Arc<MockDnsService>,
}

impl MockConnector {
    pub fn new(certificate_authority: MockCertificateAuthority, dns: MockDnsService) -> Self {
        Self {
            certificate_authority: Arc::new(certificate_authority),
            dns: Arc::new(dns),
        }
    }
}

#[async_trait]
impl ServiceConnector for MockConnector {
    async fn connect(&self, _region: &Region) -> AcmResult<RegionalServices> {
        Ok(RegionalServices {
            certificate_authority: self.certificate_authority.clone(),
            dns: self.dns.clone(),
        })
    }
}

fn parse_offset(token: Option<&str>) -> AcmResult<usize> {
    token
        .map(|t| t.parse::<usize>())
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(|e| AcmError::InvalidArgument(format!("bad page token: {e}")))
}

pub fn test_arn(id: &str) -> CertificateArn {
    CertificateArn::new(format!(
        "arn:aws:acm:us-east-1:123456789012:certificate/{id}"
    ))
}

pub fn test_certificate(arn: &str, fqdn: &str, status: CertificateStatus) -> Certificate {
    let arn = if arn.starts_with("arn:") {
        CertificateArn::new(arn)
    } else {
        test_arn(arn)
    };
    Certificate {
        arn,
        domain_name: Fqdn::new(fqdn),
        subject_alternative_names: vec![fqdn.to_string()],
        status,
        domain_validation_options: vec![pending_validation(fqdn, ValidationMethod::Dns)],
        failure_reason: None,
        revocation_reason: None,
        not_after: None,
    }
}

pub fn pending_validation(domain: &str, method: ValidationMethod) -> DomainValidation {
    DomainValidation {
        domain_name: domain.to_string(),
        validation_domain: Some(domain.to_string()),
        validation_method: Some(method),
        resource_record: None,
    }
}

/// Challenge record in the shape the certificate authority hands out
pub fn challenge_record(fqdn: &Fqdn) -> ResourceRecord {
    ResourceRecord {
        name: format!("_{}.{}", "0123456789abcdef0123456789abcdef", fqdn.absolute()),
        record_type: "CNAME".to_string(),
        value: "_fedcba9876543210.acm-validations.aws.".to_string(),
    }
}

pub fn cname(name: &str, value: &str) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: "CNAME".to_string(),
        ttl: Some(300),
        values: vec![value.to_string()],
    }
}
