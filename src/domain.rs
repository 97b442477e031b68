//! Value types shared by the resolver and the reconciler.

use std::fmt;

use crate::error::InvalidInput;

/// Hosted zone used as the alias target for every CloudFront distribution.
///
/// This value is global; it does not vary by region or account.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// Longest DNS name Route53 and Cognito accept.
const MAX_DOMAIN_LEN: usize = 253;

/// Location of an alias record: a name inside a hosted zone.
///
/// Names compare as DNS names, ignoring a trailing root dot and ASCII case.
#[derive(Debug, Clone)]
pub struct DomainRecord {
    hosted_zone_id: String,
    name: String,
}

impl DomainRecord {
    /// Build a record location, rejecting empty fields.
    pub fn new(
        hosted_zone_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, InvalidInput> {
        let hosted_zone_id = hosted_zone_id.into();
        let name = name.into();
        if hosted_zone_id.trim().is_empty() {
            return Err(InvalidInput::HostedZoneId);
        }
        validate_domain_name(&name)?;
        Ok(Self {
            hosted_zone_id,
            name,
        })
    }

    /// Route53 hosted zone id.
    pub fn hosted_zone_id(&self) -> &str {
        &self.hosted_zone_id
    }

    /// Record name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for DomainRecord {
    fn eq(&self, other: &Self) -> bool {
        self.hosted_zone_id == other.hosted_zone_id && same_dns_name(&self.name, &other.name)
    }
}

impl Eq for DomainRecord {}

impl fmt::Display for DomainRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hosted_zone_id, self.name)
    }
}

/// Cognito domain status, kept as an opaque string so unknown values survive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistributionStatus(String);

impl DistributionStatus {
    /// Domain is being created.
    pub const CREATING: &'static str = "CREATING";
    /// Domain is live.
    pub const ACTIVE: &'static str = "ACTIVE";
    /// Domain is being updated.
    pub const UPDATING: &'static str = "UPDATING";
    /// Domain is being torn down.
    pub const DELETING: &'static str = "DELETING";
    /// Domain provisioning failed.
    pub const FAILED: &'static str = "FAILED";

    /// Wrap a raw status string.
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// Status reported when Cognito has no description for the domain.
    pub fn absent() -> Self {
        Self(String::new())
    }

    /// Raw status string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The distribution can be (or soon will be) served.
    pub fn is_usable(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::CREATING | Self::ACTIVE | Self::UPDATING
        )
    }

    /// The domain is gone or going away; there is nothing to publish.
    pub fn is_terminal_absent(&self) -> bool {
        matches!(self.0.as_str(), Self::DELETING | Self::FAILED | "")
    }
}

impl fmt::Display for DistributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record types the locator scans for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordType {
    /// IPv4 alias.
    A,
    /// IPv6 alias.
    Aaaa,
    /// Anything else found in the zone.
    Other(String),
}

impl RecordType {
    /// Route53 wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Alias target of an observed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    /// Hosted zone of the alias target.
    pub hosted_zone_id: String,
    /// DNS name the alias points at.
    pub dns_name: String,
}

/// A record set observed in a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecordSet {
    /// Fully qualified record name, as Route53 returns it.
    pub name: String,
    /// Record type.
    pub record_type: RecordType,
    /// Alias target, if this is an alias record.
    pub alias_target: Option<AliasTarget>,
}

impl AliasRecordSet {
    /// Whether this record is a CloudFront alias pointing at `endpoint`.
    pub fn points_at(&self, endpoint: &str) -> bool {
        self.alias_target.as_ref().is_some_and(|target| {
            target.hosted_zone_id == CLOUDFRONT_HOSTED_ZONE_ID
                && same_dns_name(&target.dns_name, endpoint)
        })
    }
}

/// Change actions sent to Route53.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Fails if the record exists.
    Create,
    /// Creates or replaces.
    Upsert,
    /// Fails if the record does not exist.
    Delete,
}

impl ChangeAction {
    /// Route53 wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Upsert => "UPSERT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated single-change batch pointing a record at a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasChange {
    /// What to do with the record.
    pub action: ChangeAction,
    /// Zone the change is applied to.
    pub hosted_zone_id: String,
    /// Record name.
    pub record_name: String,
    /// Record type, `A` unless a located record says otherwise.
    pub record_type: RecordType,
    /// Distribution endpoint the alias targets.
    pub dns_name: String,
}

impl AliasChange {
    /// Build an `A` alias change for `domain`.
    pub fn new(
        action: ChangeAction,
        distribution: &str,
        domain: &DomainRecord,
    ) -> Result<Self, InvalidInput> {
        Self::with_type(action, distribution, domain, RecordType::A)
    }

    /// Build an alias change with an explicit record type.
    pub fn with_type(
        action: ChangeAction,
        distribution: &str,
        domain: &DomainRecord,
        record_type: RecordType,
    ) -> Result<Self, InvalidInput> {
        if distribution.trim().is_empty() {
            return Err(InvalidInput::Change(
                "alias target DNS name is empty".to_string(),
            ));
        }
        if let RecordType::Other(other) = &record_type {
            return Err(InvalidInput::Change(format!(
                "record type {other} cannot alias a CloudFront distribution"
            )));
        }
        Ok(Self {
            action,
            hosted_zone_id: domain.hosted_zone_id().to_string(),
            record_name: domain.name().to_string(),
            record_type,
            dns_name: distribution.to_string(),
        })
    }

    /// Alias target hosted zone; always CloudFront.
    pub fn alias_hosted_zone_id(&self) -> &'static str {
        CLOUDFRONT_HOSTED_ZONE_ID
    }
}

/// Append the root dot to a DNS name if it is missing.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Compare DNS names ignoring a trailing root dot and ASCII case.
pub fn same_dns_name(a: &str, b: &str) -> bool {
    fqdn(a).eq_ignore_ascii_case(&fqdn(b))
}

/// Validate a domain name before it is sent to Cognito or Route53.
pub fn validate_domain_name(name: &str) -> Result<(), InvalidInput> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    let valid = !trimmed.is_empty()
        && trimmed.len() <= MAX_DOMAIN_LEN
        && !trimmed.chars().any(char::is_whitespace)
        && trimmed.split('.').all(|label| !label.is_empty());
    if valid {
        Ok(())
    } else {
        Err(InvalidInput::DomainName(name.to_string()))
    }
}
