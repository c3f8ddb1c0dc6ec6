use crate::error::ServiceError;
use crate::events::{AlertEvent, MetricSample};
use crate::sinks::{AlertSink, MetricSink};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Scripted responses shared by the mock sinks
///
/// Responses are returned in order. After the last response, the script
/// cycles back to the first one.
struct Script {
    responses: Vec<Result<(), ServiceError>>,
    current_index: Arc<Mutex<usize>>,
    call_count: Arc<Mutex<usize>>,
}

impl Script {
    fn new(responses: Vec<Result<(), ServiceError>>) -> Self {
        let responses = if responses.is_empty() {
            vec![Ok(())]
        } else {
            responses
        };
        Self {
            responses,
            current_index: Arc::new(Mutex::new(0)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    fn next(&self) -> Result<(), ServiceError> {
        *self.call_count.lock().unwrap() += 1;
        let mut index = self.current_index.lock().unwrap();
        let response = self.responses[*index % self.responses.len()].clone();
        *index += 1;
        response
    }

    fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

/// Mock alert sink for testing
///
/// Records every publish attempt, including failed ones, so tests can see
/// duplicate deliveries caused by retries.
pub struct MockAlertSink {
    script: Script,
    published: Arc<Mutex<Vec<AlertEvent>>>,
}

impl MockAlertSink {
    /// Create a mock sink with multiple responses
    pub fn with_responses(responses: Vec<Result<(), ServiceError>>) -> Self {
        Self {
            script: Script::new(responses),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock sink that always accepts
    pub fn success() -> Self {
        Self::with_responses(vec![Ok(())])
    }

    /// Create a mock sink that always fails with `error`
    pub fn error(error: ServiceError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Get the number of times publish() has been called
    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }

    /// Every alert handed to publish(), in call order
    pub fn published(&self) -> Vec<AlertEvent> {
        self.published.lock().unwrap().clone()
    }
}

impl AlertSink for MockAlertSink {
    fn publish<'a>(
        &'a self,
        subject: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'a>> {
        Box::pin(async move {
            self.published
                .lock()
                .unwrap()
                .push(AlertEvent::new(subject, message));
            self.script.next()
        })
    }
}

/// Mock metric sink for testing
pub struct MockMetricSink {
    script: Script,
    written: Arc<Mutex<Vec<MetricSample>>>,
}

impl MockMetricSink {
    pub fn with_responses(responses: Vec<Result<(), ServiceError>>) -> Self {
        Self {
            script: Script::new(responses),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn success() -> Self {
        Self::with_responses(vec![Ok(())])
    }

    pub fn error(error: ServiceError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }

    /// Every sample handed to put_metric(), in call order
    pub fn written(&self) -> Vec<MetricSample> {
        self.written.lock().unwrap().clone()
    }
}

impl MetricSink for MockMetricSink {
    fn put_metric<'a>(
        &'a self,
        sample: &'a MetricSample,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'a>> {
        Box::pin(async move {
            self.written.lock().unwrap().push(sample.clone());
            self.script.next()
        })
    }
}
