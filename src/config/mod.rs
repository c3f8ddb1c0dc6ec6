/// Flag and environment settings for both jobs
pub mod args;

pub use args::{
    BackoffKind, ConnectorStatusConfig, DatabaseConfig, ReplayDurationConfig, RetryArgs,
    DEFAULT_CONNECTORS,
};
