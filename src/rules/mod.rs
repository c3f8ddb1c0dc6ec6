/// Connector health rules
pub mod connector;

/// Replay latency rule
pub mod latency;

pub use connector::{
    decode_report, ConnectorEvaluation, ConnectorRules, HealthRule, StatusCodeRule, TaskStateRule,
};
pub use latency::{latency_metric, METRIC_NAME, METRIC_NAMESPACE};
