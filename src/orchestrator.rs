//! Maps lifecycle events onto distribution resolution and alias changes.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::backoff::ExponentialBackoff;
use crate::deadline::Deadline;
use crate::error::LinkError;
use crate::event::{parse_prior_record, LifecycleEvent, RequestType, ResourceProperties};
use crate::metrics::{self, Timer};
use crate::reconciler::AliasReconciler;
use crate::resolver::DistributionResolver;
use crate::status::DomainStatusReader;
use crate::zone::RecordZone;

/// Attributes returned to the stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outputs {
    /// Empty when the domain has no live distribution.
    #[serde(rename = "CloudFrontDistributionDomainName")]
    pub cloudfront_distribution_domain_name: String,
}

impl Outputs {
    fn new(distribution: String) -> Self {
        Self {
            cloudfront_distribution_domain_name: distribution,
        }
    }
}

/// Result of handling one event.
#[derive(Debug)]
pub struct Invocation {
    /// Incoming or freshly minted physical resource id.
    pub physical_resource_id: String,
    /// Outputs on success.
    pub outcome: Result<Outputs, LinkError>,
}

/// Drives one lifecycle event from start to finish.
pub struct LifecycleOrchestrator<S, Z> {
    resolver: DistributionResolver<S>,
    reconciler: AliasReconciler<Z>,
}

impl<S: DomainStatusReader, Z: RecordZone> LifecycleOrchestrator<S, Z> {
    /// Wire the orchestrator to its status reader and record zone.
    pub fn new(reader: Arc<S>, zone: Arc<Z>, backoff: ExponentialBackoff) -> Self {
        Self {
            resolver: DistributionResolver::new(reader, backoff),
            reconciler: AliasReconciler::new(zone),
        }
    }

    /// Handle `event` within `deadline`.
    pub async fn handle(&self, event: &LifecycleEvent, deadline: &Deadline) -> Invocation {
        let physical_resource_id = event.physical_resource_id_or_mint();
        self.handle_as(event, deadline, physical_resource_id).await
    }

    /// Handle `event`, giving up when `shutdown` resolves first.
    ///
    /// `shutdown` yields the name of the signal received. An interrupted
    /// invocation still carries a physical id and fails with
    /// [`LinkError::Interrupted`], so a response can be sent for it.
    pub async fn handle_until<F>(
        &self,
        event: &LifecycleEvent,
        deadline: &Deadline,
        shutdown: F,
    ) -> Invocation
    where
        F: Future<Output = &'static str>,
    {
        let timer = Timer::start();
        let physical_resource_id = event.physical_resource_id_or_mint();
        tokio::select! {
            invocation = self.handle_as(event, deadline, physical_resource_id.clone()) => invocation,
            signal = shutdown => {
                warn!(
                    physical_resource_id = %physical_resource_id,
                    signal,
                    "interrupted; abandoning in-flight requests"
                );
                metrics::record_invocation(&event.request_type, "interrupted", timer.elapsed());
                Invocation {
                    physical_resource_id,
                    outcome: Err(LinkError::Interrupted { signal }),
                }
            }
        }
    }

    async fn handle_as(
        &self,
        event: &LifecycleEvent,
        deadline: &Deadline,
        physical_resource_id: String,
    ) -> Invocation {
        let timer = Timer::start();
        info!(
            physical_resource_id = %physical_resource_id,
            request_type = %event.request_type,
            request_id = %event.request_id,
            "handling lifecycle event"
        );

        let outcome = self.dispatch(event, deadline).await;
        match &outcome {
            Ok(outputs) => info!(
                physical_resource_id = %physical_resource_id,
                distribution = %outputs.cloudfront_distribution_domain_name,
                "lifecycle event handled"
            ),
            Err(e) => error!(
                physical_resource_id = %physical_resource_id,
                error = %e,
                "lifecycle event failed"
            ),
        }
        let result = match &outcome {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_invocation(&event.request_type, result, timer.elapsed());

        Invocation {
            physical_resource_id,
            outcome,
        }
    }

    async fn dispatch(
        &self,
        event: &LifecycleEvent,
        deadline: &Deadline,
    ) -> Result<Outputs, LinkError> {
        let request_type = RequestType::parse(&event.request_type)?;
        let properties = ResourceProperties::parse(&event.resource_properties)?;

        match request_type {
            RequestType::Create => self.on_create(&properties, deadline).await,
            RequestType::Update => self.on_update(event, &properties, deadline).await,
            RequestType::Delete => self.on_delete(&properties, deadline).await,
        }
    }

    async fn on_create(
        &self,
        properties: &ResourceProperties,
        deadline: &Deadline,
    ) -> Result<Outputs, LinkError> {
        let distribution = self
            .resolver
            .resolve(&properties.domain, true, deadline)
            .await?;

        match &properties.record {
            Some(record) if !distribution.is_empty() => {
                self.reconciler
                    .create(&distribution, record, deadline)
                    .await?;
            }
            Some(_) => warn!(
                domain = %properties.domain,
                "domain has no live distribution; not creating alias record"
            ),
            None => info!(domain = %properties.domain, "record creation disabled"),
        }
        Ok(Outputs::new(distribution))
    }

    async fn on_update(
        &self,
        event: &LifecycleEvent,
        properties: &ResourceProperties,
        deadline: &Deadline,
    ) -> Result<Outputs, LinkError> {
        // Prior state is checked before any upstream call.
        let previous = match &properties.record {
            Some(_) => Some(parse_prior_record(&event.old_resource_properties)?),
            None => None,
        };

        let distribution = self
            .resolver
            .resolve(&properties.domain, true, deadline)
            .await?;

        match (previous, &properties.record) {
            (Some(old), Some(new)) if !distribution.is_empty() => {
                self.reconciler
                    .upsert(&distribution, &old, new, deadline)
                    .await?;
            }
            (Some(_), Some(_)) => warn!(
                domain = %properties.domain,
                "domain has no live distribution; not updating alias record"
            ),
            _ => info!(domain = %properties.domain, "record creation disabled"),
        }
        Ok(Outputs::new(distribution))
    }

    async fn on_delete(
        &self,
        properties: &ResourceProperties,
        deadline: &Deadline,
    ) -> Result<Outputs, LinkError> {
        // Single attempt; the domain may already be torn down.
        let distribution = self
            .resolver
            .resolve(&properties.domain, false, deadline)
            .await?;

        let Some(record) = &properties.record else {
            info!(domain = %properties.domain, "record creation disabled");
            return Ok(Outputs::new(distribution));
        };

        if distribution.is_empty() {
            info!(
                record = %record,
                "domain has no live distribution; leaving hosted zone untouched"
            );
            return Ok(Outputs::default());
        }

        self.reconciler
            .delete(&distribution, record, deadline)
            .await?;
        Ok(Outputs::new(distribution))
    }
}
