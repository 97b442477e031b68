//! Configuration types for cognito-domain-link.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backoff::ExponentialBackoff;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// AWS client configuration.
    #[serde(default)]
    pub aws: AwsConfig,

    /// Distribution polling configuration.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Invocation time budget.
    #[serde(default)]
    pub invocation: InvocationConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// AWS client overrides. Everything defaults to the SDK's own resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region override (e.g., "us-east-1").
    #[serde(default)]
    pub region: Option<String>,

    /// Cognito endpoint override (e.g., a LocalStack URL).
    #[serde(default)]
    pub cognito_endpoint: Option<String>,

    /// Route53 endpoint override.
    #[serde(default)]
    pub route53_endpoint: Option<String>,
}

/// Exponential backoff settings for polling the domain status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// First retry interval in milliseconds.
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    /// Growth factor applied to the interval after each attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Jitter applied to each interval, as a fraction in `[0, 1]`.
    #[serde(default = "default_randomization_factor")]
    pub randomization_factor: f64,

    /// Upper bound for a single interval in milliseconds.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Give up after this many seconds of polling.
    #[serde(default = "default_max_elapsed_secs")]
    pub max_elapsed_secs: u64,
}

impl ResolverConfig {
    /// Build a fresh backoff schedule from these settings.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            multiplier: self.multiplier,
            randomization_factor: self.randomization_factor.clamp(0.0, 1.0),
            max_interval: Duration::from_millis(self.max_interval_ms),
            max_elapsed_time: Some(Duration::from_secs(self.max_elapsed_secs)),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            multiplier: default_multiplier(),
            randomization_factor: default_randomization_factor(),
            max_interval_ms: default_max_interval_ms(),
            max_elapsed_secs: default_max_elapsed_secs(),
        }
    }
}

/// Invocation time budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationConfig {
    /// Total time allowed for one event, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time reserved at the end of the budget for sending the response.
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,
}

impl InvocationConfig {
    /// Budget available to the orchestrator.
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.saturating_sub(self.safety_margin_secs))
    }
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            safety_margin_secs: default_safety_margin_secs(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "cognito_domain_link=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_initial_interval_ms() -> u64 {
    500
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_randomization_factor() -> f64 {
    0.5
}

fn default_max_interval_ms() -> u64 {
    60_000
}

fn default_max_elapsed_secs() -> u64 {
    900
}

// Lambda's hard ceiling.
fn default_timeout_secs() -> u64 {
    900
}

fn default_safety_margin_secs() -> u64 {
    10
}
