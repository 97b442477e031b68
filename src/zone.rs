//! Route53 hosted zone access: one page of listings, one change batch.

use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    AliasTarget as SdkAliasTarget, Change, ChangeAction as SdkChangeAction, ChangeBatch,
    ResourceRecordSet, RrType,
};
use aws_sdk_route53::Client;
use tracing::debug;

use crate::config::AwsConfig;
use crate::domain::{AliasChange, AliasRecordSet, AliasTarget, ChangeAction, RecordType};
use crate::error::{InvalidInput, LinkError};

/// Where a record listing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetQuery {
    /// Zone to list.
    pub hosted_zone_id: String,
    /// First record name, fully qualified.
    pub start_name: String,
    /// First record type.
    pub start_type: RecordType,
    /// Set identifier for weighted/latency records, from a previous page.
    pub start_identifier: Option<String>,
}

/// One page of record sets.
#[derive(Debug, Clone, Default)]
pub struct RecordSetPage {
    /// Records on this page.
    pub record_sets: Vec<AliasRecordSet>,
    /// Cursor for the next page; `None` when the listing is exhausted.
    pub next: Option<RecordSetQuery>,
}

/// The DNS service as the reconciler sees it.
#[async_trait]
pub trait RecordZone: Send + Sync {
    /// Fetch one page of record sets.
    async fn list_record_sets(&self, query: &RecordSetQuery) -> Result<RecordSetPage, LinkError>;

    /// Submit a single-change batch.
    async fn change_record_sets(&self, change: &AliasChange) -> Result<(), LinkError>;
}

/// [`RecordZone`] backed by the Route53 API.
#[derive(Clone, Debug)]
pub struct Route53Zone {
    client: Client,
}

impl Route53Zone {
    /// Build a zone client from shared SDK config plus local overrides.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &AwsConfig) -> Self {
        let mut builder = aws_sdk_route53::config::Builder::from(sdk_config);
        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_route53::config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.route53_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl RecordZone for Route53Zone {
    async fn list_record_sets(&self, query: &RecordSetQuery) -> Result<RecordSetPage, LinkError> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&query.hosted_zone_id)
            .start_record_name(&query.start_name)
            .start_record_type(RrType::from(query.start_type.as_str()))
            .set_start_record_identifier(query.start_identifier.clone())
            .send()
            .await
            .map_err(|e| LinkError::upstream("route53", DisplayErrorContext(e)))?;

        let record_sets = output
            .resource_record_sets()
            .iter()
            .map(from_sdk_record)
            .collect();

        let next = match (output.is_truncated(), output.next_record_name()) {
            (true, Some(name)) => Some(RecordSetQuery {
                hosted_zone_id: query.hosted_zone_id.clone(),
                start_name: name.to_string(),
                start_type: output
                    .next_record_type()
                    .map(|t| RecordType::from(t.as_str()))
                    .unwrap_or_else(|| query.start_type.clone()),
                start_identifier: output.next_record_identifier().map(str::to_string),
            }),
            _ => None,
        };

        Ok(RecordSetPage { record_sets, next })
    }

    async fn change_record_sets(&self, change: &AliasChange) -> Result<(), LinkError> {
        let batch = to_sdk_batch(change)?;
        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&change.hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| LinkError::upstream("route53", DisplayErrorContext(e)))?;

        debug!(
            action = %change.action,
            name = %change.record_name,
            change_id = ?output.change_info().map(|info| info.id()),
            "submitted record change"
        );
        Ok(())
    }
}

fn from_sdk_record(record: &ResourceRecordSet) -> AliasRecordSet {
    AliasRecordSet {
        name: record.name().to_string(),
        record_type: RecordType::from(record.r#type().as_str()),
        alias_target: record.alias_target().map(|target| AliasTarget {
            hosted_zone_id: target.hosted_zone_id().to_string(),
            dns_name: target.dns_name().to_string(),
        }),
    }
}

fn to_sdk_batch(change: &AliasChange) -> Result<ChangeBatch, InvalidInput> {
    let invalid = |e: aws_sdk_route53::error::BuildError| InvalidInput::Change(e.to_string());

    let action = match change.action {
        ChangeAction::Create => SdkChangeAction::Create,
        ChangeAction::Upsert => SdkChangeAction::Upsert,
        ChangeAction::Delete => SdkChangeAction::Delete,
    };
    let alias_target = SdkAliasTarget::builder()
        .dns_name(&change.dns_name)
        .evaluate_target_health(false)
        .hosted_zone_id(change.alias_hosted_zone_id())
        .build()
        .map_err(invalid)?;
    let record_set = ResourceRecordSet::builder()
        .name(&change.record_name)
        .r#type(RrType::from(change.record_type.as_str()))
        .alias_target(alias_target)
        .build()
        .map_err(invalid)?;
    let sdk_change = Change::builder()
        .action(action)
        .resource_record_set(record_set)
        .build()
        .map_err(invalid)?;
    ChangeBatch::builder()
        .changes(sdk_change)
        .build()
        .map_err(invalid)
}
