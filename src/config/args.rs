//! Settings for both jobs, taken from flags or their environment variables
//!
//! Scheduled invocations configure everything through the environment. A
//! required value that is missing or blank stops the process during
//! argument parsing, before any probing starts.

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use clap::builder::BoolishValueParser;
use clap::{Args, ValueEnum};
use std::time::Duration;

/// Connectors watched when `CONNECTOR_NAMES` is not set
pub const DEFAULT_CONNECTORS: [&str; 2] =
    ["JdbcSinkRoundInteractions", "JdbcSinkVanillaInteractions"];

/// Settings for the connector-status job
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ConnectorStatusConfig {
    /// Base URL of the connector REST API
    #[arg(long, env = "CONNECTOR_BASE_URL", value_parser = parse_base_url)]
    pub base_url: String,

    /// SNS topic that receives alerts
    #[arg(long, env = "SNS_TOPIC_ARN", value_parser = non_blank)]
    pub topic_arn: String,

    /// Connectors to check, in order
    #[arg(
        long = "connector",
        env = "CONNECTOR_NAMES",
        value_delimiter = ',',
        value_parser = non_blank,
        default_values_t = DEFAULT_CONNECTORS.map(String::from)
    )]
    pub connectors: Vec<String>,

    /// Whole-request timeout for each status call, in seconds
    #[arg(
        long,
        env = "HTTP_TIMEOUT_SECS",
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub http_timeout_secs: u64,

    #[command(flatten)]
    pub retry: RetryArgs,
}

impl ConnectorStatusConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Connection settings for the round-interaction database
///
/// The password is resolved from the secret store at run time and is not
/// part of the configuration.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    #[arg(long = "db-host", env = "DB_HOST", value_parser = non_blank)]
    pub host: String,

    #[arg(long = "db-port", env = "DB_PORT")]
    pub port: u16,

    #[arg(long = "db-name", env = "DB_NAME", value_parser = non_blank)]
    pub name: String,

    #[arg(long = "db-username", env = "DB_USERNAME", value_parser = non_blank)]
    pub username: String,
}

/// Settings for the replay-duration job
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ReplayDurationConfig {
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Secret holding the database password under "password"
    #[arg(long, env = "DATABASE_SECRET_ARN", value_parser = non_blank)]
    pub secret_id: String,

    /// Trailing window of inserted rounds to sample, in minutes
    #[arg(
        long,
        env = "REPLAY_WINDOW_MINUTES",
        default_value = "30",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub window_minutes: u32,

    /// Publish the RoundId dimension alongside each metric
    #[arg(
        long,
        env = "REPLAY_METRIC_DIMENSIONS",
        value_parser = BoolishValueParser::new()
    )]
    pub publish_dimensions: bool,

    #[command(flatten)]
    pub retry: RetryArgs,
}

/// Wait strategy between attempts
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Retry budget for every external write
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryArgs {
    /// Attempts per external write, including the first
    #[arg(
        long,
        env = "RETRY_MAX_ATTEMPTS",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub retry_max_attempts: u32,

    /// Delay after a failed attempt in milliseconds; the starting delay
    /// when backoff is exponential
    #[arg(long, env = "RETRY_DELAY_MS", default_value = "1000")]
    pub retry_delay_ms: u64,

    #[arg(long, env = "RETRY_BACKOFF", value_enum, default_value_t = BackoffKind::Fixed)]
    pub retry_backoff: BackoffKind,

    /// Longest wait between attempts with exponential backoff, in milliseconds
    #[arg(long, env = "RETRY_MAX_DELAY_MS", default_value = "30000")]
    pub retry_max_delay_ms: u64,
}

impl RetryArgs {
    pub fn policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        match self.retry_backoff {
            BackoffKind::Fixed => RetryPolicy::fixed(self.retry_max_attempts, delay),
            BackoffKind::Exponential => RetryPolicy::exponential(
                self.retry_max_attempts,
                delay,
                Duration::from_millis(self.retry_max_delay_ms).max(delay),
            ),
        }
    }
}

/// Trimmed value, rejecting blanks
fn non_blank(value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Blank);
    }
    Ok(value.to_string())
}

/// Absolute http(s) URL without a trailing slash
fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let value = non_blank(value)?;
    let url = reqwest::Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
        value: value.clone(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            reason: format!("unsupported scheme {:?}", url.scheme()),
            value,
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}
