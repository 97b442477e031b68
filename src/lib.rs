//! Cognito Domain Link - keeps a Route53 alias in step with the CloudFront
//! distribution Amazon Cognito assigns to a user pool custom domain.
//!
//! The crate handles CloudFormation custom resource events. Cognito allocates
//! the distribution asynchronously, so the domain status is polled with
//! exponential backoff until an endpoint appears; the endpoint is then
//! published as an alias record and moved or removed as the stack changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     LifecycleOrchestrator                       │
//! │          Create / Update / Delete → outputs + physical id       │
//! │                                                                 │
//! │  ┌──────────────────────┐        ┌──────────────────────┐      │
//! │  │ DistributionResolver │        │   AliasReconciler    │      │
//! │  │ (backoff polling)    │        │ create/upsert/delete │      │
//! │  └──────────┬───────────┘        └──────────┬───────────┘      │
//! │             │                               │                   │
//! │             ▼                               ▼                   │
//! │  ┌──────────────────────┐        ┌──────────────────────┐      │
//! │  │ DomainStatusReader   │        │    AliasLocator      │      │
//! │  │ (DescribeUserPool-   │        │ (paged record scan)  │      │
//! │  │  Domain)             │        └──────────┬───────────┘      │
//! │  └──────────────────────┘                   ▼                   │
//! │                                  ┌──────────────────────┐      │
//! │                                  │ RecordZone (Route53) │      │
//! │                                  └──────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cognito_domain_link::{
//!     CognitoStatusReader, Config, Deadline, LifecycleEvent, LifecycleOrchestrator, Route53Zone,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let sdk = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//!     let orchestrator = LifecycleOrchestrator::new(
//!         Arc::new(CognitoStatusReader::new(&sdk, &config.aws)),
//!         Arc::new(Route53Zone::new(&sdk, &config.aws)),
//!         config.resolver.backoff(),
//!     );
//!
//!     let event: LifecycleEvent = serde_json::from_str(EVENT_JSON).unwrap();
//!     let deadline = Deadline::after(config.invocation.budget());
//!     let invocation = orchestrator.handle(&event, &deadline).await;
//!     println!("{:?}", invocation.outcome);
//! }
//! ```

#![warn(missing_docs)]

pub mod backoff;
pub mod config;
pub mod deadline;
pub mod domain;
pub mod error;
pub mod event;
pub mod locator;
pub mod metrics;
pub mod orchestrator;
pub mod reconciler;
pub mod resolver;
pub mod response;
pub mod status;
pub mod telemetry;
pub mod zone;

// Re-export main types
pub use config::{AwsConfig, Config, InvocationConfig, ResolverConfig, TelemetryConfig};
pub use deadline::Deadline;
pub use domain::{DistributionStatus, DomainRecord, CLOUDFRONT_HOSTED_ZONE_ID};
pub use error::{InvalidInput, LinkError};
pub use event::LifecycleEvent;
pub use orchestrator::{Invocation, LifecycleOrchestrator, Outputs};
pub use response::CustomResourceResponse;
pub use status::{CognitoStatusReader, DomainStatusReader};
pub use zone::{RecordZone, Route53Zone};
