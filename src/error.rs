//! Error types for cognito-domain-link.

use thiserror::Error;

/// Errors that can occur while linking a domain to its distribution.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A required property was missing or malformed. Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The domain exists but has no usable distribution yet.
    #[error("domain {domain} does not have a usable CloudFront distribution (status {status:?})")]
    DomainNotReady {
        /// Cognito custom domain that was polled.
        domain: String,
        /// Last observed domain status.
        status: String,
    },

    /// Network, auth, or throttling failure from Cognito or Route53.
    #[error("{service} request failed: {message}")]
    Upstream {
        /// Service that failed (`cognito` or `route53`).
        service: &'static str,
        /// Rendered SDK error.
        message: String,
    },

    /// An update event arrived without the previous domain or hosted zone.
    #[error("update event is missing previous {property}")]
    MissingPriorState {
        /// Name of the missing property.
        property: &'static str,
    },

    /// Request type other than Create, Update or Delete.
    #[error("unsupported request type: {0}")]
    UnsupportedRequestType(String),

    /// The invocation deadline passed while an operation was in flight.
    #[error("invocation deadline exceeded during {operation}")]
    DeadlineExceeded {
        /// Operation that was aborted.
        operation: &'static str,
    },

    /// The process was told to stop before the invocation finished.
    #[error("interrupted by {signal} before the invocation finished")]
    Interrupted {
        /// Signal that stopped the invocation.
        signal: &'static str,
    },

    /// The response document could not be delivered to the dispatcher.
    #[error("failed to send custom resource response: {0}")]
    Response(String),
}

/// Validation failures for resource properties and change batches.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidInput {
    /// Domain name is absent, empty or not a DNS name.
    #[error("invalid domain name provided: {0:?}")]
    DomainName(String),

    /// Hosted zone id is absent or empty.
    #[error("invalid route 53 hosted zone ID provided")]
    HostedZoneId,

    /// `CreateRecord` is neither a boolean nor ENABLED/DISABLED.
    #[error("invalid value provided for CreateRecord flag: {0}")]
    CreateRecord(String),

    /// A required property is absent.
    #[error("missing required property {0}")]
    MissingProperty(&'static str),

    /// The record change could not be built.
    #[error("invalid record change: {0}")]
    Change(String),
}

impl LinkError {
    /// Build an upstream error from any displayable SDK failure.
    pub fn upstream(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: err.to_string(),
        }
    }

    /// Whether the resolver's backoff loop should stop on this error.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::MissingPriorState { .. }
                | Self::UnsupportedRequestType(_)
                | Self::DeadlineExceeded { .. }
                | Self::Interrupted { .. }
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DomainNotReady { .. } => "domain_not_ready",
            Self::Upstream { .. } => "upstream",
            Self::MissingPriorState { .. } => "missing_prior_state",
            Self::UnsupportedRequestType(_) => "unsupported_request_type",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Interrupted { .. } => "interrupted",
            Self::Response(_) => "response",
        }
    }
}
