//! Shared test infrastructure: in-memory Cognito and Route53 fakes.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use cognito_domain_link::backoff::ExponentialBackoff;
use cognito_domain_link::domain::{
    same_dns_name, AliasChange, AliasRecordSet, AliasTarget, ChangeAction, RecordType,
};
use cognito_domain_link::status::{DomainStatus, DomainStatusReader};
use cognito_domain_link::zone::{RecordSetPage, RecordSetQuery, RecordZone};
use cognito_domain_link::{
    DistributionStatus, LifecycleEvent, LifecycleOrchestrator, LinkError, CLOUDFRONT_HOSTED_ZONE_ID,
};

// --- Constants ---

pub const DOMAIN: &str = "auth.example.com";
pub const DISTRIBUTION: &str = "d111111abcdef8.cloudfront.net";
pub const ZONE_A: &str = "ZAAAAAAAAAAAAA";
pub const ZONE_B: &str = "ZBBBBBBBBBBBBB";
pub const STACK_ID: &str =
    "arn:aws:cloudformation:us-east-2:123456789012:stack/cognito-domain-link/0921f5ae-0daf-4830-9a3c-ea1aa479a9d2";
pub const LOGICAL_ID: &str = "UserPoolDomainDistribution";

// --- FakeStatusReader ---

/// Cognito stand-in replaying scripted statuses per domain.
///
/// Each read consumes one scripted answer; the last one repeats forever.
#[derive(Default)]
pub struct FakeStatusReader {
    domains: Mutex<HashMap<String, VecDeque<DomainStatus>>>,
    calls: Mutex<u32>,
}

impl FakeStatusReader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Report `status` and `distribution` for `domain`.
    pub fn set(&self, domain: &str, status: &str, distribution: &str) {
        self.script(domain, &[(status, distribution)]);
    }

    /// Report each `(status, distribution)` in turn.
    pub fn script(&self, domain: &str, answers: &[(&str, &str)]) {
        let answers = answers
            .iter()
            .map(|(status, distribution)| DomainStatus {
                distribution: distribution.to_string(),
                status: DistributionStatus::new(*status),
            })
            .collect();
        self.domains.lock().insert(domain.to_string(), answers);
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock()
    }
}

#[async_trait]
impl DomainStatusReader for FakeStatusReader {
    async fn read(&self, domain: &str) -> Result<DomainStatus, LinkError> {
        cognito_domain_link::domain::validate_domain_name(domain)?;
        *self.calls.lock() += 1;
        let mut domains = self.domains.lock();
        let Some(answers) = domains.get_mut(domain) else {
            return Ok(DomainStatus::default());
        };
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        Ok(answer.unwrap_or_default())
    }
}

// --- FakeZone ---

/// Route53 stand-in with paged listings and strict change semantics.
pub struct FakeZone {
    zones: Mutex<HashMap<String, Vec<AliasRecordSet>>>,
    changes: Mutex<Vec<AliasChange>>,
    pages_served: Mutex<u32>,
    page_size: usize,
    fail_changes: Mutex<bool>,
}

impl FakeZone {
    pub fn new() -> Arc<Self> {
        Self::with_page_size(100)
    }

    pub fn with_page_size(page_size: usize) -> Arc<Self> {
        Arc::new(Self {
            zones: Mutex::new(HashMap::new()),
            changes: Mutex::new(Vec::new()),
            pages_served: Mutex::new(0),
            page_size,
            fail_changes: Mutex::new(false),
        })
    }

    /// Seed a CloudFront alias record.
    pub fn seed_alias(&self, zone: &str, name: &str, record_type: RecordType, target: &str) {
        self.seed(
            zone,
            AliasRecordSet {
                name: fqdn(name),
                record_type,
                alias_target: Some(AliasTarget {
                    hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.to_string(),
                    dns_name: target.to_string(),
                }),
            },
        );
    }

    /// Seed a non-alias record.
    pub fn seed_plain(&self, zone: &str, name: &str, record_type: RecordType) {
        self.seed(
            zone,
            AliasRecordSet {
                name: fqdn(name),
                record_type,
                alias_target: None,
            },
        );
    }

    fn seed(&self, zone: &str, record: AliasRecordSet) {
        let mut zones = self.zones.lock();
        let records = zones.entry(zone.to_string()).or_default();
        records.push(record);
        records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    }

    /// Every record in `zone`.
    pub fn records(&self, zone: &str) -> Vec<AliasRecordSet> {
        self.zones.lock().get(zone).cloned().unwrap_or_default()
    }

    /// Every change submitted, successful or not.
    pub fn changes(&self) -> Vec<AliasChange> {
        self.changes.lock().clone()
    }

    pub fn change_actions(&self) -> Vec<ChangeAction> {
        self.changes().iter().map(|c| c.action).collect()
    }

    pub fn pages_served(&self) -> u32 {
        *self.pages_served.lock()
    }

    /// Make every subsequent change fail.
    pub fn fail_changes(&self) {
        *self.fail_changes.lock() = true;
    }
}

fn fqdn(name: &str) -> String {
    cognito_domain_link::domain::fqdn(name)
}

fn sort_key(record: &AliasRecordSet) -> (String, String) {
    (
        record.name.to_ascii_lowercase(),
        record.record_type.as_str().to_string(),
    )
}

#[async_trait]
impl RecordZone for FakeZone {
    async fn list_record_sets(&self, query: &RecordSetQuery) -> Result<RecordSetPage, LinkError> {
        *self.pages_served.lock() += 1;
        let zones = self.zones.lock();
        let Some(records) = zones.get(&query.hosted_zone_id) else {
            return Err(LinkError::upstream("route53", "NoSuchHostedZone"));
        };

        let start = (
            query.start_name.to_ascii_lowercase(),
            query.start_type.as_str().to_string(),
        );
        let remaining: Vec<_> = records
            .iter()
            .filter(|r| sort_key(r) >= start)
            .cloned()
            .collect();

        let record_sets: Vec<_> = remaining.iter().take(self.page_size).cloned().collect();
        let next = remaining.get(self.page_size).map(|r| RecordSetQuery {
            hosted_zone_id: query.hosted_zone_id.clone(),
            start_name: r.name.clone(),
            start_type: r.record_type.clone(),
            start_identifier: None,
        });

        Ok(RecordSetPage { record_sets, next })
    }

    async fn change_record_sets(&self, change: &AliasChange) -> Result<(), LinkError> {
        self.changes.lock().push(change.clone());
        if *self.fail_changes.lock() {
            return Err(LinkError::upstream("route53", "Throttling"));
        }

        let mut zones = self.zones.lock();
        let records = zones.entry(change.hosted_zone_id.clone()).or_default();
        let position = records.iter().position(|r| {
            same_dns_name(&r.name, &change.record_name) && r.record_type == change.record_type
        });
        let record = AliasRecordSet {
            name: fqdn(&change.record_name),
            record_type: change.record_type.clone(),
            alias_target: Some(AliasTarget {
                hosted_zone_id: change.alias_hosted_zone_id().to_string(),
                dns_name: change.dns_name.clone(),
            }),
        };

        match (change.action, position) {
            (ChangeAction::Create, Some(_)) => {
                return Err(LinkError::upstream(
                    "route53",
                    "InvalidChangeBatch: record already exists",
                ))
            }
            (ChangeAction::Create, None) | (ChangeAction::Upsert, None) => records.push(record),
            (ChangeAction::Upsert, Some(i)) => records[i] = record,
            (ChangeAction::Delete, Some(i)) if records[i].points_at(&change.dns_name) => {
                records.remove(i);
            }
            (ChangeAction::Delete, _) => {
                return Err(LinkError::upstream(
                    "route53",
                    "InvalidChangeBatch: record not found",
                ))
            }
        }
        records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        Ok(())
    }
}

// --- Orchestrator wiring ---

/// Backoff short enough for paused-clock tests.
pub fn quick_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        multiplier: 2.0,
        randomization_factor: 0.0,
        max_interval: Duration::from_millis(100),
        max_elapsed_time: Some(Duration::from_secs(2)),
    }
}

pub fn build_orchestrator(
    reader: &Arc<FakeStatusReader>,
    zone: &Arc<FakeZone>,
) -> LifecycleOrchestrator<FakeStatusReader, FakeZone> {
    LifecycleOrchestrator::new(reader.clone(), zone.clone(), quick_backoff())
}

// --- Event builders ---

pub fn properties(domain: &str, zone: Option<&str>, create_record: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "ServiceToken".to_string(),
        json!("arn:aws:lambda:us-east-2:123456789012:function:link"),
    );
    map.insert("Domain".to_string(), json!(domain));
    map.insert("CreateRecord".to_string(), create_record);
    if let Some(zone) = zone {
        map.insert("HostedZoneID".to_string(), json!(zone));
    }
    map
}

pub fn event(request_type: &str, properties: Map<String, Value>) -> LifecycleEvent {
    LifecycleEvent {
        request_type: request_type.to_string(),
        response_url: "http://pre-signed-S3-url-for-response".to_string(),
        stack_id: STACK_ID.to_string(),
        request_id: "c2664381-dabc-49d0-8347-bc2c01e12ea6".to_string(),
        resource_type: "Custom::UserPoolDomainDistribution".to_string(),
        logical_resource_id: LOGICAL_ID.to_string(),
        physical_resource_id: None,
        resource_properties: properties,
        old_resource_properties: Map::new(),
    }
}

pub fn create_event(properties: Map<String, Value>) -> LifecycleEvent {
    event("Create", properties)
}

pub fn update_event(
    properties: Map<String, Value>,
    old_properties: Map<String, Value>,
) -> LifecycleEvent {
    LifecycleEvent {
        physical_resource_id: Some("cognito-domain-link-UserPoolDomainDistribution-EXISTING00001".to_string()),
        old_resource_properties: old_properties,
        ..event("Update", properties)
    }
}

pub fn delete_event(properties: Map<String, Value>) -> LifecycleEvent {
    LifecycleEvent {
        physical_resource_id: Some("cognito-domain-link-UserPoolDomainDistribution-EXISTING00001".to_string()),
        ..event("Delete", properties)
    }
}
