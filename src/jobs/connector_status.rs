use crate::config::ConnectorStatusConfig;
use crate::error::RunError;
use crate::probes::{ConnectorProbe, HttpConnectorProbe};
use crate::rules::ConnectorRules;
use crate::sinks::{AlertNotifier, SnsAlertSink};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Outcome of one connector-status invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectorRunSummary {
    pub connectors_checked: usize,
    pub alerts_sent: usize,
}

/// Checks each configured connector in order and alerts on anything that
/// is not healthy
pub struct ConnectorStatusJob {
    probe: Arc<dyn ConnectorProbe>,
    rules: ConnectorRules,
    notifier: AlertNotifier,
    connectors: Vec<String>,
}

impl ConnectorStatusJob {
    pub fn new(
        probe: Arc<dyn ConnectorProbe>,
        rules: ConnectorRules,
        notifier: AlertNotifier,
        connectors: Vec<String>,
    ) -> Self {
        Self {
            probe,
            rules,
            notifier,
            connectors,
        }
    }

    /// Wire the HTTP probe and SNS notifier from configuration
    pub fn from_config(
        config: &ConnectorStatusConfig,
        sdk_config: &aws_config::SdkConfig,
    ) -> Result<Self, RunError> {
        let probe = HttpConnectorProbe::new(config.base_url.clone(), config.http_timeout())?;
        let sink = SnsAlertSink::from_config(sdk_config, config.topic_arn.clone());
        info!("Alerts go to {}", config.topic_arn);

        Ok(Self::new(
            Arc::new(probe),
            ConnectorRules::default(),
            AlertNotifier::new(Arc::new(sink), config.retry.policy()),
            config.connectors.clone(),
        ))
    }

    /// Run one pass over every connector
    ///
    /// Stops at the first probe failure, undecodable body or alert that
    /// could not be delivered. Alerts already sent stay sent.
    pub async fn run(&self) -> Result<ConnectorRunSummary, RunError> {
        let mut summary = ConnectorRunSummary::default();
        debug!(
            "Checking {} connectors against {} rules",
            self.connectors.len(),
            self.rules.rule_count()
        );

        for connector in &self.connectors {
            info!("Checking connector {}", connector);
            let response = self.probe.fetch_status(connector).await?;
            debug!("Connector {} answered HTTP {}", connector, response.status);

            let evaluation = self.rules.evaluate(&response);
            if evaluation.alerts.is_empty() && evaluation.decode_error.is_none() {
                info!("Connector {} is healthy", connector);
            }

            for alert in &evaluation.alerts {
                warn!("Connector {} unhealthy: {}", connector, alert.subject);
                self.notifier
                    .notify(alert)
                    .await
                    .map_err(|source| {
                        error!(
                            "Giving up on alert for {} after {} attempt(s): {}",
                            connector,
                            source.attempts(),
                            source.last_error()
                        );
                        RunError::Alert {
                            subject: alert.subject.clone(),
                            source,
                        }
                    })?;
                summary.alerts_sent += 1;
            }

            if let Some(error) = evaluation.decode_error {
                return Err(error.into());
            }
            summary.connectors_checked += 1;
        }

        Ok(summary)
    }
}
