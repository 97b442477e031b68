//! Invocation deadline observed by every network-bound call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::LinkError;

/// Point in time after which in-flight work is abandoned.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Some(Instant::now() + budget),
        }
    }

    /// No deadline.
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Time left, or `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Run `fut`, aborting it when the deadline passes.
    pub async fn run<F, T>(&self, operation: &'static str, fut: F) -> Result<T, LinkError>
    where
        F: Future<Output = Result<T, LinkError>>,
    {
        match self.at {
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| LinkError::DeadlineExceeded { operation })?,
            None => fut.await,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
