//! Polls Cognito until a custom domain's CloudFront distribution is usable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backoff::ExponentialBackoff;
use crate::deadline::Deadline;
use crate::error::LinkError;
use crate::metrics::{self, ResolutionResult};
use crate::status::DomainStatusReader;

/// Resolves the distribution endpoint for a custom domain.
pub struct DistributionResolver<S> {
    reader: Arc<S>,
    backoff: ExponentialBackoff,
}

impl<S: DomainStatusReader> DistributionResolver<S> {
    /// Create a resolver polling `reader` on the given schedule.
    pub fn new(reader: Arc<S>, backoff: ExponentialBackoff) -> Self {
        Self { reader, backoff }
    }

    /// Resolve the distribution endpoint for `domain`.
    ///
    /// Returns an empty string when the domain is deleting, failed, or gone.
    /// With `retry` set, `DomainNotReady` and upstream failures are retried
    /// until the backoff budget (capped by `deadline`) runs out; the last
    /// error is then returned. Without it, exactly one attempt is made.
    pub async fn resolve(
        &self,
        domain: &str,
        retry: bool,
        deadline: &Deadline,
    ) -> Result<String, LinkError> {
        let mut backoff = self
            .backoff
            .clone()
            .capped(deadline.remaining())
            .start();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let err = match self.attempt(domain, deadline).await {
                Ok(distribution) => {
                    let result = if distribution.is_empty() {
                        ResolutionResult::Absent
                    } else {
                        info!(domain, %distribution, attempts, "resolved CloudFront distribution");
                        ResolutionResult::Resolved
                    };
                    metrics::record_resolution(result, attempts);
                    return Ok(distribution);
                }
                Err(err) => err,
            };

            if !retry || err.is_permanent() {
                metrics::record_resolution(ResolutionResult::Failed, attempts);
                return Err(err);
            }

            match backoff.next_backoff() {
                Some(delay) => {
                    debug!(
                        domain,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "distribution not ready, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    warn!(
                        domain,
                        attempts,
                        elapsed_ms = backoff.elapsed().as_millis() as u64,
                        error = %err,
                        "gave up waiting for CloudFront distribution"
                    );
                    metrics::record_resolution(ResolutionResult::Failed, attempts);
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, domain: &str, deadline: &Deadline) -> Result<String, LinkError> {
        info!(domain, "describing user pool domain");
        let observed = deadline
            .run("describe user pool domain", self.reader.read(domain))
            .await?;

        if observed.status.is_terminal_absent() {
            info!(
                domain,
                status = %observed.status,
                "domain is deleted or failed; nothing to publish"
            );
            return Ok(String::new());
        }
        if observed.status.is_usable() && !observed.distribution.is_empty() {
            return Ok(observed.distribution);
        }
        Err(LinkError::DomainNotReady {
            domain: domain.to_string(),
            status: observed.status.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DistributionStatus;
    use crate::error::InvalidInput;
    use crate::status::DomainStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone)]
    enum Answer {
        Observed(&'static str, &'static str),
        Throttled,
        Invalid,
    }

    /// Replays scripted answers, repeating the last one.
    struct Scripted {
        answers: Mutex<Vec<Answer>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(answers: Vec<Answer>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DomainStatusReader for Scripted {
        async fn read(&self, _domain: &str) -> Result<DomainStatus, LinkError> {
            *self.calls.lock().unwrap() += 1;
            let answer = {
                let mut answers = self.answers.lock().unwrap();
                if answers.len() > 1 {
                    answers.remove(0)
                } else {
                    answers[0].clone()
                }
            };
            match answer {
                Answer::Observed(status, distribution) => Ok(DomainStatus {
                    distribution: distribution.to_string(),
                    status: DistributionStatus::new(status),
                }),
                Answer::Throttled => Err(LinkError::upstream("cognito", "throttled")),
                Answer::Invalid => Err(InvalidInput::DomainName(String::new()).into()),
            }
        }
    }

    fn quick() -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(10),
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_interval: Duration::from_millis(100),
            max_elapsed_time: Some(Duration::from_secs(1)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_distribution_appears() {
        let reader = Scripted::new(vec![
            Answer::Observed("CREATING", ""),
            Answer::Throttled,
            Answer::Observed("CREATING", "d1.cloudfront.net"),
        ]);
        let resolver = DistributionResolver::new(reader.clone(), quick());

        let distribution = resolver
            .resolve("auth.example.com", true, &Deadline::none())
            .await
            .unwrap();

        assert_eq!(distribution, "d1.cloudfront.net");
        assert_eq!(reader.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_retry_single_attempt() {
        let reader = Scripted::new(vec![Answer::Observed("ACTIVE", "")]);
        let resolver = DistributionResolver::new(reader.clone(), quick());

        let err = resolver
            .resolve("auth.example.com", false, &Deadline::none())
            .await
            .unwrap_err();

        assert!(matches!(err, LinkError::DomainNotReady { .. }));
        assert_eq!(reader.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_not_ready() {
        let reader = Scripted::new(vec![Answer::Observed("UPDATING", "")]);
        let resolver = DistributionResolver::new(reader.clone(), quick());

        let err = resolver
            .resolve("auth.example.com", true, &Deadline::none())
            .await
            .unwrap_err();

        assert!(matches!(err, LinkError::DomainNotReady { ref status, .. } if status == "UPDATING"));
        assert!(reader.calls() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_caps_backoff_budget() {
        let reader = Scripted::new(vec![Answer::Observed("CREATING", "")]);
        let policy = ExponentialBackoff {
            max_elapsed_time: None,
            ..quick()
        };
        let resolver = DistributionResolver::new(reader.clone(), policy);

        let err = resolver
            .resolve(
                "auth.example.com",
                true,
                &Deadline::after(Duration::from_millis(200)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LinkError::DomainNotReady { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_is_not_ready() {
        let reader = Scripted::new(vec![Answer::Observed("MIGRATING", "d1.cloudfront.net")]);
        let resolver = DistributionResolver::new(reader, quick());

        let err = resolver
            .resolve("auth.example.com", false, &Deadline::none())
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::DomainNotReady { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_is_not_retried() {
        let reader = Scripted::new(vec![Answer::Invalid]);
        let resolver = DistributionResolver::new(reader.clone(), quick());

        let err = resolver.resolve("", true, &Deadline::none()).await.unwrap_err();
        assert!(matches!(err, LinkError::InvalidInput(_)));
        assert_eq!(reader.calls(), 1);
    }
}
