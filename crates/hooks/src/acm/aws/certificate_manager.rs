//! AWS Certificate Manager backend

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_acm::error::DisplayErrorContext;
use aws_sdk_acm::types as acm;
use aws_sdk_acm::Client;
use chrono::DateTime;
use stackhooks_common::{CertificateArn, Fqdn};

use crate::acm::error::{AcmError, AcmResult};
use crate::acm::provider::CertificateAuthority;
use crate::acm::types::{
    Certificate, CertificateRequest, CertificateStatus, CertificateSummary, DomainValidation, Page,
    ResourceRecord, ValidationMethod,
};

const SERVICE: &str = "acm";

#[derive(Debug, Clone)]
pub struct AcmService {
    client: Client,
}

impl AcmService {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl CertificateAuthority for AcmService {
    async fn list_certificates(
        &self,
        next_token: Option<String>,
    ) -> AcmResult<Page<CertificateSummary>> {
        let output = self
            .client
            .list_certificates()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AcmError::service(SERVICE, "ListCertificates", DisplayErrorContext(&e)))?;

        let items = output
            .certificate_summary_list()
            .iter()
            .filter_map(|summary| {
                Some(CertificateSummary {
                    arn: CertificateArn::new(summary.certificate_arn()?),
                    domain_name: summary.domain_name()?.to_string(),
                })
            })
            .collect();

        Ok(Page::new(items, output.next_token().map(str::to_string)))
    }

    async fn describe_certificate(&self, arn: &CertificateArn) -> AcmResult<Certificate> {
        let output = self
            .client
            .describe_certificate()
            .certificate_arn(arn.as_str())
            .send()
            .await
            .map_err(|e| AcmError::service(SERVICE, "DescribeCertificate", DisplayErrorContext(&e)))?;

        let detail = output.certificate().ok_or_else(|| AcmError::MalformedResponse {
            service: SERVICE,
            message: format!("DescribeCertificate returned no detail for {arn}"),
        })?;

        Ok(certificate_from_detail(arn, detail))
    }

    async fn request_certificate(&self, request: &CertificateRequest) -> AcmResult<CertificateArn> {
        let options = request
            .domain_validation_options
            .iter()
            .map(|option| {
                acm::DomainValidationOption::builder()
                    .domain_name(&option.domain_name)
                    .validation_domain(&option.validation_domain)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AcmError::InvalidArgument(e.to_string()))?;

        let subject_alternative_names = (!request.subject_alternative_names.is_empty())
            .then(|| request.subject_alternative_names.clone());

        let output = self
            .client
            .request_certificate()
            .domain_name(request.domain_name.as_str())
            .validation_method(sdk_validation_method(request.validation_method))
            .set_subject_alternative_names(subject_alternative_names)
            .idempotency_token(&request.idempotency_token)
            .set_domain_validation_options(Some(options))
            .send()
            .await
            .map_err(|e| AcmError::service(SERVICE, "RequestCertificate", DisplayErrorContext(&e)))?;

        output
            .certificate_arn()
            .map(CertificateArn::new)
            .ok_or_else(|| AcmError::MalformedResponse {
                service: SERVICE,
                message: "RequestCertificate returned no certificate ARN".to_string(),
            })
    }

    async fn delete_certificate(&self, arn: &CertificateArn) -> AcmResult<()> {
        self.client
            .delete_certificate()
            .certificate_arn(arn.as_str())
            .send()
            .await
            .map_err(|e| AcmError::service(SERVICE, "DeleteCertificate", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn resend_validation_email(
        &self,
        arn: &CertificateArn,
        domain: &str,
        validation_domain: &str,
    ) -> AcmResult<()> {
        self.client
            .resend_validation_email()
            .certificate_arn(arn.as_str())
            .domain(domain)
            .validation_domain(validation_domain)
            .send()
            .await
            .map_err(|e| AcmError::service(SERVICE, "ResendValidationEmail", DisplayErrorContext(&e)))?;
        Ok(())
    }
}

fn certificate_from_detail(arn: &CertificateArn, detail: &acm::CertificateDetail) -> Certificate {
    Certificate {
        arn: detail
            .certificate_arn()
            .map(CertificateArn::new)
            .unwrap_or_else(|| arn.clone()),
        domain_name: Fqdn::new(detail.domain_name().unwrap_or_default()),
        subject_alternative_names: detail.subject_alternative_names().to_vec(),
        status: detail
            .status()
            .map(|status| CertificateStatus::from_api(status.as_str()))
            .unwrap_or_else(|| CertificateStatus::Other("UNKNOWN".to_string())),
        domain_validation_options: detail
            .domain_validation_options()
            .iter()
            .map(domain_validation_from_sdk)
            .collect(),
        failure_reason: detail.failure_reason().map(|r| r.as_str().to_string()),
        revocation_reason: detail.revocation_reason().map(|r| r.as_str().to_string()),
        not_after: detail
            .not_after()
            .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}

fn domain_validation_from_sdk(validation: &acm::DomainValidation) -> DomainValidation {
    DomainValidation {
        domain_name: validation.domain_name().to_string(),
        validation_domain: validation.validation_domain().map(str::to_string),
        validation_method: validation
            .validation_method()
            .and_then(|method| method.as_str().parse().ok()),
        resource_record: validation.resource_record().map(|record| ResourceRecord {
            name: record.name().to_string(),
            record_type: record.r#type().as_str().to_string(),
            value: record.value().to_string(),
        }),
    }
}

fn sdk_validation_method(method: ValidationMethod) -> acm::ValidationMethod {
    match method {
        ValidationMethod::Dns => acm::ValidationMethod::Dns,
        ValidationMethod::Email => acm::ValidationMethod::Email,
    }
}
