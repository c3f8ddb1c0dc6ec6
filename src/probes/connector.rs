use crate::error::ProbeError;
use log::{debug, info};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Raw outcome of one status request
///
/// Any HTTP status counts as a response; only transport failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// Connector that was probed, as configured
    pub connector: String,
    pub status: u16,
    pub body: String,
}

impl StatusResponse {
    pub fn new(connector: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            connector: connector.into(),
            status,
            body: body.into(),
        }
    }
}

/// Trait for fetching a connector's status document
pub trait ConnectorProbe: Send + Sync {
    fn fetch_status<'a>(
        &'a self,
        connector: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusResponse, ProbeError>> + Send + 'a>>;
}

/// Connector probe backed by the connector REST API
///
/// Issues exactly one `GET {base_url}/connectors/{name}/status` per call and
/// never retries.
pub struct HttpConnectorProbe {
    client: Client,
    base_url: String,
}

impl HttpConnectorProbe {
    /// Create a new probe
    ///
    /// # Arguments
    /// * `base_url` - Connector REST API root (e.g., "http://connect:8083")
    /// * `timeout` - Whole-request timeout applied by the client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Format the status endpoint URL for a connector
    fn status_url(&self, connector: &str) -> String {
        format!(
            "{}/connectors/{}/status",
            self.base_url.trim_end_matches('/'),
            connector
        )
    }
}

impl ConnectorProbe for HttpConnectorProbe {
    fn fetch_status<'a>(
        &'a self,
        connector: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusResponse, ProbeError>> + Send + 'a>> {
        Box::pin(async move {
            let endpoint = self.status_url(connector);
            debug!("Fetching connector status from {}", endpoint);

            let transport = |e: reqwest::Error| ProbeError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            };

            let response = self
                .client
                .get(&endpoint)
                .send()
                .await
                .map_err(transport)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport)?;

            info!("Connector {} status endpoint returned {}", connector, status);

            Ok(StatusResponse {
                connector: connector.to_string(),
                status,
                body,
            })
        })
    }
}
