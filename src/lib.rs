/// Error types for configuration, probes, services and runs
pub mod error;

/// Data model shared by probes, rules and sinks
pub mod events;

/// Bounded retry policy and executor
pub mod retry;

/// Environment-driven configuration
pub mod config;

/// Shared AWS SDK setup and error classification
pub mod aws;

/// Read-only probes for connector status and replay samples
pub mod probes;

/// Pure rules turning probe results into alerts and metrics
pub mod rules;

/// Alert and metric sinks with retrying delivery
pub mod sinks;

/// Secret store access and credential resolution
pub mod secrets;

/// The connector-status and replay-duration pipelines
pub mod jobs;

// Re-export commonly used types
pub use error::{ConfigError, ProbeError, RetryError, RunError, SecretError, ServiceError};
pub use jobs::{ConnectorStatusJob, ReplayDurationJob};
pub use retry::{Backoff, RetryPolicy};
