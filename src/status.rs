//! Cognito custom domain status reads.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::Client;
use tracing::debug;

use crate::config::AwsConfig;
use crate::domain::{validate_domain_name, DistributionStatus};
use crate::error::LinkError;
use crate::metrics::{self, Timer};

/// What Cognito reports for a custom domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainStatus {
    /// CloudFront distribution DNS name; empty until allocated.
    pub distribution: String,
    /// Domain status.
    pub status: DistributionStatus,
}

/// Reads the current state of a custom domain. No retries, no side effects.
#[async_trait]
pub trait DomainStatusReader: Send + Sync {
    /// Describe `domain`.
    async fn read(&self, domain: &str) -> Result<DomainStatus, LinkError>;
}

/// [`DomainStatusReader`] backed by `DescribeUserPoolDomain`.
#[derive(Clone, Debug)]
pub struct CognitoStatusReader {
    client: Client,
}

impl CognitoStatusReader {
    /// Build a reader from shared SDK config plus local overrides.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &AwsConfig) -> Self {
        let mut builder = aws_sdk_cognitoidentityprovider::config::Builder::from(sdk_config);
        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_cognitoidentityprovider::config::Region::new(
                region.clone(),
            ));
        }
        if let Some(endpoint) = &config.cognito_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl DomainStatusReader for CognitoStatusReader {
    async fn read(&self, domain: &str) -> Result<DomainStatus, LinkError> {
        validate_domain_name(domain)?;

        let timer = Timer::start();
        let output = self
            .client
            .describe_user_pool_domain()
            .domain(domain)
            .send()
            .await
            .map_err(|e| {
                metrics::record_status_read_error("upstream");
                LinkError::upstream("cognito", DisplayErrorContext(e))
            })?;

        // Cognito answers with an empty description for unknown domains.
        let status = match output.domain_description() {
            Some(desc) if desc.domain().is_some() || desc.status().is_some() => DomainStatus {
                distribution: desc.cloud_front_distribution().unwrap_or_default().to_string(),
                status: desc
                    .status()
                    .map(|s| DistributionStatus::new(s.as_str()))
                    .unwrap_or_default(),
            },
            _ => DomainStatus::default(),
        };

        metrics::record_status_read(status.status.as_str(), timer.elapsed());
        debug!(
            domain,
            status = %status.status,
            distribution = %status.distribution,
            "described user pool domain"
        );
        Ok(status)
    }
}
