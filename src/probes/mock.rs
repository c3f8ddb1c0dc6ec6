use crate::error::ProbeError;
use crate::events::ReplaySample;
use crate::probes::{ConnectorProbe, ReplayProbe, ReplaySource, StatusResponse};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Mock connector probe for testing
///
/// Returns a canned response per connector name and records the order in
/// which connectors were probed. Unknown connectors produce a transport
/// error.
#[derive(Default)]
pub struct MockConnectorProbe {
    responses: HashMap<String, Result<StatusResponse, ProbeError>>,
    probed: Arc<Mutex<Vec<String>>>,
}

impl MockConnectorProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `connector` with the given status code and body
    pub fn with_status(mut self, connector: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            connector.to_string(),
            Ok(StatusResponse::new(connector, status, body)),
        );
        self
    }

    /// Fail requests for `connector` with the given error
    pub fn with_error(mut self, connector: &str, error: ProbeError) -> Self {
        self.responses.insert(connector.to_string(), Err(error));
        self
    }

    /// Connectors probed so far, in call order
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

impl ConnectorProbe for MockConnectorProbe {
    fn fetch_status<'a>(
        &'a self,
        connector: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusResponse, ProbeError>> + Send + 'a>> {
        Box::pin(async move {
            self.probed.lock().unwrap().push(connector.to_string());
            match self.responses.get(connector) {
                Some(response) => response.clone(),
                None => Err(ProbeError::Transport {
                    endpoint: format!("mock://connectors/{}/status", connector),
                    reason: "connection refused".to_string(),
                }),
            }
        })
    }
}

/// Mock replay probe yielding a fixed sequence of rows
pub struct MockReplayProbe {
    rows: Vec<Result<ReplaySample, ProbeError>>,
}

impl MockReplayProbe {
    pub fn new(rows: Vec<Result<ReplaySample, ProbeError>>) -> Self {
        Self { rows }
    }
}

impl ReplayProbe for MockReplayProbe {
    fn recent_samples(&self) -> BoxStream<'_, Result<ReplaySample, ProbeError>> {
        stream::iter(self.rows.clone()).boxed()
    }
}

/// Mock replay source that hands out a [`MockReplayProbe`]
///
/// Records every password it was opened with.
pub struct MockReplaySource {
    rows: Vec<Result<ReplaySample, ProbeError>>,
    open_error: Option<ProbeError>,
    passwords: Arc<Mutex<Vec<String>>>,
}

impl MockReplaySource {
    pub fn with_rows(rows: Vec<Result<ReplaySample, ProbeError>>) -> Self {
        Self {
            rows,
            open_error: None,
            passwords: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_samples(samples: Vec<ReplaySample>) -> Self {
        Self::with_rows(samples.into_iter().map(Ok).collect())
    }

    /// Make `open` fail, as when the database refuses the connection
    pub fn failing(error: ProbeError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::with_rows(Vec::new())
        }
    }

    pub fn passwords(&self) -> Vec<String> {
        self.passwords.lock().unwrap().clone()
    }
}

impl ReplaySource for MockReplaySource {
    fn open<'a>(
        &'a self,
        password: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ReplayProbe>, ProbeError>> + Send + 'a>> {
        Box::pin(async move {
            self.passwords.lock().unwrap().push(password.to_string());
            if let Some(error) = &self.open_error {
                return Err(error.clone());
            }
            Ok(Box::new(MockReplayProbe::new(self.rows.clone())) as Box<dyn ReplayProbe>)
        })
    }
}
