//! CloudFormation custom resource events and their resource properties.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::{validate_domain_name, DomainRecord};
use crate::error::{InvalidInput, LinkError};

/// `Domain` property key.
pub const DOMAIN_KEY: &str = "Domain";
/// `HostedZoneID` property key.
pub const HOSTED_ZONE_ID_KEY: &str = "HostedZoneID";
/// `CreateRecord` property key.
pub const CREATE_RECORD_KEY: &str = "CreateRecord";

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 12;

/// A custom resource request as delivered by CloudFormation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    /// `Create`, `Update` or `Delete`.
    pub request_type: String,
    /// Pre-signed URL the response document is PUT to.
    #[serde(rename = "ResponseURL", default)]
    pub response_url: String,
    /// Stack ARN.
    #[serde(default)]
    pub stack_id: String,
    /// Request id, echoed in the response.
    #[serde(default)]
    pub request_id: String,
    /// Resource type from the template.
    #[serde(default)]
    pub resource_type: String,
    /// Logical id from the template.
    #[serde(default)]
    pub logical_resource_id: String,
    /// Physical id, absent on create.
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    /// Current resource properties.
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    /// Previous resource properties, on update only.
    #[serde(default)]
    pub old_resource_properties: Map<String, Value>,
}

impl LifecycleEvent {
    /// Incoming physical id, or a freshly minted one when absent.
    pub fn physical_resource_id_or_mint(&self) -> String {
        match self.physical_resource_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => new_physical_resource_id(&self.stack_id, &self.logical_resource_id),
        }
    }
}

/// Lifecycle operations this resource handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// Stack create.
    Create,
    /// Stack update.
    Update,
    /// Stack delete or rollback.
    Delete,
}

impl RequestType {
    /// Parse the event's request type.
    pub fn parse(value: &str) -> Result<Self, LinkError> {
        match value {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(LinkError::UnsupportedRequestType(other.to_string())),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// Parsed current resource properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceProperties {
    /// Cognito custom domain.
    pub domain: String,
    /// Alias location; `None` when `CreateRecord` is disabled.
    pub record: Option<DomainRecord>,
}

impl ResourceProperties {
    /// Parse `Domain`, `CreateRecord` and (when enabled) `HostedZoneID`.
    pub fn parse(properties: &Map<String, Value>) -> Result<Self, InvalidInput> {
        let domain = match properties.get(DOMAIN_KEY) {
            Some(Value::String(domain)) => domain.clone(),
            Some(other) => return Err(InvalidInput::DomainName(other.to_string())),
            None => return Err(InvalidInput::MissingProperty(DOMAIN_KEY)),
        };
        validate_domain_name(&domain)?;

        let create_record = match properties.get(CREATE_RECORD_KEY) {
            Some(value) => parse_create_record(value)?,
            None => return Err(InvalidInput::MissingProperty(CREATE_RECORD_KEY)),
        };

        let record = if create_record {
            let hosted_zone_id = match properties.get(HOSTED_ZONE_ID_KEY) {
                Some(Value::String(id)) => id.clone(),
                _ => return Err(InvalidInput::HostedZoneId),
            };
            Some(DomainRecord::new(hosted_zone_id, domain.clone())?)
        } else {
            None
        };

        Ok(Self { domain, record })
    }
}

/// Parse the previous `Domain`/`HostedZoneID` of an update event.
pub fn parse_prior_record(properties: &Map<String, Value>) -> Result<DomainRecord, LinkError> {
    let domain = properties
        .get(DOMAIN_KEY)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(LinkError::MissingPriorState {
            property: DOMAIN_KEY,
        })?;
    let hosted_zone_id = properties
        .get(HOSTED_ZONE_ID_KEY)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(LinkError::MissingPriorState {
            property: HOSTED_ZONE_ID_KEY,
        })?;
    Ok(DomainRecord::new(hosted_zone_id, domain)?)
}

/// Accepts JSON booleans, "true"/"false" and "ENABLED"/"DISABLED".
fn parse_create_record(value: &Value) -> Result<bool, InvalidInput> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(s) if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("enabled") => {
            Ok(true)
        }
        Value::String(s)
            if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("disabled") =>
        {
            Ok(false)
        }
        other => Err(InvalidInput::CreateRecord(other.to_string())),
    }
}

/// Mint `{stack-name}-{logical-id}-{12 random [A-Z0-9]}`.
pub fn new_physical_resource_id(stack_id: &str, logical_resource_id: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect();
    format!(
        "{}-{}-{}",
        stack_name(stack_id),
        logical_resource_id,
        suffix
    )
}

/// Stack name from an ARN like `arn:aws:cloudformation:region:acct:stack/NAME/uuid`.
fn stack_name(stack_id: &str) -> &str {
    stack_id.split('/').nth(1).unwrap_or(stack_id)
}
