//! Creates, moves and removes the alias record for a distribution.
//!
//! Moving a domain is a two-phase protocol: the stale record is located
//! first, then the changes are submitted. An upsert at the new name or zone
//! never removes the record at the old one, so the old record is deleted
//! explicitly before the new one is written.

use std::sync::Arc;

use tracing::{info, warn};

use crate::deadline::Deadline;
use crate::domain::{AliasChange, ChangeAction, DomainRecord};
use crate::error::LinkError;
use crate::locator::AliasLocator;
use crate::metrics;
use crate::zone::RecordZone;

/// Applies alias record changes for a CloudFront distribution.
pub struct AliasReconciler<Z> {
    zone: Arc<Z>,
    locator: AliasLocator<Z>,
}

impl<Z: RecordZone> AliasReconciler<Z> {
    /// Create a reconciler writing to `zone`.
    pub fn new(zone: Arc<Z>) -> Self {
        Self {
            locator: AliasLocator::new(zone.clone()),
            zone,
        }
    }

    /// Locator sharing this reconciler's zone.
    pub fn locator(&self) -> &AliasLocator<Z> {
        &self.locator
    }

    /// Create the alias record for `domain`.
    pub async fn create(
        &self,
        distribution: &str,
        domain: &DomainRecord,
        deadline: &Deadline,
    ) -> Result<(), LinkError> {
        info!(
            distribution,
            hosted_zone_id = domain.hosted_zone_id(),
            domain = domain.name(),
            "creating alias of CloudFront distribution"
        );
        let change = AliasChange::new(ChangeAction::Create, distribution, domain)?;
        self.submit(&change, deadline).await
    }

    /// Move the alias record from `old` to `new`.
    ///
    /// A no-op when both are equal. Otherwise any record in the old zone that
    /// points at `distribution` is deleted before the new record is upserted.
    pub async fn upsert(
        &self,
        distribution: &str,
        old: &DomainRecord,
        new: &DomainRecord,
        deadline: &Deadline,
    ) -> Result<(), LinkError> {
        if old == new {
            warn!(
                existing = %old,
                new = %new,
                "existing record and new record are the same, no change"
            );
            return Ok(());
        }

        info!(
            distribution,
            from = %old,
            to = %new,
            "updating alias of CloudFront distribution"
        );

        // The replacement is validated before the zone is touched.
        let upsert = AliasChange::new(ChangeAction::Upsert, distribution, new)?;

        let stale = self
            .locator
            .find(old.hosted_zone_id(), old.name(), distribution, deadline)
            .await?;

        match stale {
            Some(record) => {
                let existing = DomainRecord::new(old.hosted_zone_id(), record.name.as_str())?;
                let delete = AliasChange::with_type(
                    ChangeAction::Delete,
                    distribution,
                    &existing,
                    record.record_type,
                )?;
                info!(record = %existing, "deleting previous alias record");
                self.submit(&delete, deadline).await?;
            }
            None => warn!(
                hosted_zone_id = old.hosted_zone_id(),
                domain = old.name(),
                "previous alias record was not found; will not attempt deletion"
            ),
        }

        self.submit(&upsert, deadline).await
    }

    /// Delete the alias record for `domain`. Absence is reported by Route53.
    pub async fn delete(
        &self,
        distribution: &str,
        domain: &DomainRecord,
        deadline: &Deadline,
    ) -> Result<(), LinkError> {
        info!(
            distribution,
            hosted_zone_id = domain.hosted_zone_id(),
            domain = domain.name(),
            "deleting alias of CloudFront distribution"
        );
        let change = AliasChange::new(ChangeAction::Delete, distribution, domain)?;
        self.submit(&change, deadline).await
    }

    async fn submit(&self, change: &AliasChange, deadline: &Deadline) -> Result<(), LinkError> {
        let result = deadline
            .run(
                "change resource record sets",
                self.zone.change_record_sets(change),
            )
            .await;
        metrics::record_change(change.action, result.is_ok());
        result
    }
}
