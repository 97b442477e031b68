//! Metrics instrumentation for cognito-domain-link.
//!
//! All metrics are prefixed with `domain_link.`

use metrics::{counter, histogram};
use std::time::Instant;

use crate::domain::ChangeAction;

/// Record a Cognito domain status read.
pub fn record_status_read(status: &str, duration: std::time::Duration) {
    counter!("domain_link.status_read.count", "status" => status.to_string()).increment(1);
    histogram!("domain_link.status_read.duration.seconds").record(duration.as_secs_f64());
}

/// Record a failed Cognito domain status read.
pub fn record_status_read_error(kind: &'static str) {
    counter!("domain_link.status_read.error.count", "kind" => kind).increment(1);
}

/// Record how a resolution ended.
pub fn record_resolution(result: ResolutionResult, attempts: u32) {
    let result_str = match result {
        ResolutionResult::Resolved => "resolved",
        ResolutionResult::Absent => "absent",
        ResolutionResult::Failed => "failed",
    };

    counter!("domain_link.resolution.count", "result" => result_str).increment(1);
    histogram!("domain_link.resolution.attempts").record(f64::from(attempts));
}

/// Resolution outcome for metrics.
#[derive(Debug, Clone, Copy)]
pub enum ResolutionResult {
    /// Endpoint found.
    Resolved,
    /// Domain deleting, failed, or gone.
    Absent,
    /// Retries exhausted or a permanent error.
    Failed,
}

/// Record one page fetched while searching a hosted zone.
pub fn record_record_page(record_type: &str, records: usize) {
    counter!("domain_link.record_page.count", "type" => record_type.to_string()).increment(1);
    histogram!("domain_link.record_page.records").record(records as f64);
}

/// Record a Route53 change submission.
pub fn record_change(action: ChangeAction, success: bool) {
    let result = if success { "success" } else { "error" };
    counter!("domain_link.change.count", "action" => action.as_str(), "result" => result)
        .increment(1);
}

/// Record a processed lifecycle event.
pub fn record_invocation(request_type: &str, result: &'static str, duration: std::time::Duration) {
    counter!(
        "domain_link.invocation.count",
        "request_type" => request_type.to_string(),
        "result" => result
    )
    .increment(1);
    histogram!("domain_link.invocation.duration.seconds", "request_type" => request_type.to_string())
        .record(duration.as_secs_f64());
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
