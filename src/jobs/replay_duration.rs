use crate::config::ReplayDurationConfig;
use crate::error::RunError;
use crate::probes::{PostgresReplaySource, ReplaySource};
use crate::rules::{latency_metric, METRIC_NAMESPACE};
use crate::secrets::{CredentialResolver, SecretsManagerStore};
use crate::sinks::{CloudWatchMetricSink, MetricEmitter};
use futures::TryStreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Outcome of one replay-duration invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayRunSummary {
    pub rows: usize,
    pub metrics_emitted: usize,
    pub metrics_failed: usize,
    pub negative_durations: usize,
}

/// Turns recently processed rounds into latency metrics
pub struct ReplayDurationJob {
    resolver: CredentialResolver,
    secret_id: String,
    source: Arc<dyn ReplaySource>,
    emitter: MetricEmitter,
}

impl ReplayDurationJob {
    pub fn new(
        resolver: CredentialResolver,
        secret_id: String,
        source: Arc<dyn ReplaySource>,
        emitter: MetricEmitter,
    ) -> Self {
        Self {
            resolver,
            secret_id,
            source,
            emitter,
        }
    }

    /// Wire Secrets Manager, PostgreSQL and CloudWatch from configuration
    pub fn from_config(config: &ReplayDurationConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        let store = SecretsManagerStore::from_config(sdk_config);
        let source = PostgresReplaySource::new(config.database.clone(), config.window_minutes);
        let sink = CloudWatchMetricSink::from_config(sdk_config, METRIC_NAMESPACE.to_string())
            .with_dimensions(config.publish_dimensions);
        let policy = config.retry.policy();

        Self::new(
            CredentialResolver::new(Arc::new(store), policy),
            config.secret_id.clone(),
            Arc::new(source),
            MetricEmitter::new(Arc::new(sink), policy),
        )
    }

    /// Resolve the password, read the window, emit one metric per row
    ///
    /// A metric that cannot be written is logged and skipped. Credential,
    /// connection and row errors end the run.
    pub async fn run(&self) -> Result<ReplayRunSummary, RunError> {
        let password = self.resolver.database_password(&self.secret_id).await?;
        let probe = self.source.open(&password).await?;

        let mut summary = ReplayRunSummary::default();
        let mut samples = probe.recent_samples();

        while let Some(sample) = samples.try_next().await? {
            summary.rows += 1;
            let metric = latency_metric(&sample);

            if metric.value < 0.0 {
                warn!(
                    "Round {} was inserted {:.3}s before it was created",
                    sample.round_id, -metric.value
                );
                summary.negative_durations += 1;
            }
            debug!("Round {} took {:.3}s", sample.round_id, metric.value);

            match self.emitter.emit(&metric).await {
                Ok(()) => summary.metrics_emitted += 1,
                Err(e) => {
                    error!(
                        "Skipping metric for round {} after {} attempt(s): {}",
                        sample.round_id,
                        e.attempts(),
                        e.last_error()
                    );
                    summary.metrics_failed += 1;
                }
            }
        }

        info!(
            "Processed {} rounds: {} metrics written, {} failed",
            summary.rows, summary.metrics_emitted, summary.metrics_failed
        );
        Ok(summary)
    }
}
