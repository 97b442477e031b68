//! Finds the alias record that currently points at a distribution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::deadline::Deadline;
use crate::domain::{fqdn, AliasRecordSet, RecordType};
use crate::error::LinkError;
use crate::metrics;
use crate::zone::{RecordSetQuery, RecordZone};

/// Searches a hosted zone page by page.
pub struct AliasLocator<Z> {
    zone: Arc<Z>,
}

impl<Z: RecordZone> AliasLocator<Z> {
    /// Create a locator over `zone`.
    pub fn new(zone: Arc<Z>) -> Self {
        Self { zone }
    }

    /// Find an `A` (then `AAAA`) CloudFront alias targeting `distribution`,
    /// scanning from `domain` onwards. `None` means there is nothing to remove.
    pub async fn find(
        &self,
        hosted_zone_id: &str,
        domain: &str,
        distribution: &str,
        deadline: &Deadline,
    ) -> Result<Option<AliasRecordSet>, LinkError> {
        for record_type in [RecordType::A, RecordType::Aaaa] {
            let found = self
                .scan(hosted_zone_id, domain, &record_type, deadline, |record| {
                    record.record_type == record_type && record.points_at(distribution)
                })
                .await?;
            if found.is_some() {
                return Ok(found);
            }
            if record_type == RecordType::A {
                warn!(
                    hosted_zone_id,
                    domain,
                    distribution,
                    "no A record matches CloudFront distribution, searching AAAA records"
                );
            }
        }
        Ok(None)
    }

    async fn scan<F>(
        &self,
        hosted_zone_id: &str,
        domain: &str,
        record_type: &RecordType,
        deadline: &Deadline,
        matches: F,
    ) -> Result<Option<AliasRecordSet>, LinkError>
    where
        F: Fn(&AliasRecordSet) -> bool,
    {
        let mut query = Some(RecordSetQuery {
            hosted_zone_id: hosted_zone_id.to_string(),
            start_name: fqdn(domain),
            start_type: record_type.clone(),
            start_identifier: None,
        });

        while let Some(current) = query.take() {
            let page = deadline
                .run(
                    "list resource record sets",
                    self.zone.list_record_sets(&current),
                )
                .await?;
            metrics::record_record_page(record_type.as_str(), page.record_sets.len());

            if let Some(found) = page.record_sets.into_iter().find(|r| matches(r)) {
                debug!(
                    hosted_zone_id,
                    name = %found.name,
                    record_type = found.record_type.as_str(),
                    "found CloudFront alias record"
                );
                return Ok(Some(found));
            }
            query = page.next;
        }
        Ok(None)
    }
}
