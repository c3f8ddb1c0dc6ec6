//! Alert and metric sinks plus the retrying notifier/emitter around them
//!
//! Sinks perform a single write per call; retry lives in [`notifier`].

use crate::error::ServiceError;
use crate::events::MetricSample;
use std::future::Future;
use std::pin::Pin;

/// SNS-backed alert sink
pub mod sns;

/// CloudWatch-backed metric sink
pub mod cloudwatch;

/// Retrying alert notifier and metric emitter
pub mod notifier;

/// In-memory sinks for tests
pub mod mock;

pub use cloudwatch::CloudWatchMetricSink;
pub use mock::{MockAlertSink, MockMetricSink};
pub use notifier::{AlertNotifier, MetricEmitter};
pub use sns::SnsAlertSink;

/// Trait for publish-only alert destinations
pub trait AlertSink: Send + Sync {
    fn publish<'a>(
        &'a self,
        subject: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'a>>;
}

/// Trait for write-only metric backends
pub trait MetricSink: Send + Sync {
    fn put_metric<'a>(
        &'a self,
        sample: &'a MetricSample,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'a>>;
}
