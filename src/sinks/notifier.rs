use crate::error::{RetryError, ServiceError};
use crate::events::{AlertEvent, MetricSample};
use crate::retry::{retry, RetryPolicy};
use crate::sinks::{AlertSink, MetricSink};
use log::{error, info};
use std::sync::Arc;

/// SNS rejects subjects of 100 characters or more
pub const MAX_SUBJECT_LEN: usize = 99;

/// Delivers alerts to an [`AlertSink`] with bounded retry
///
/// Delivery is at-least-once: a publish that succeeded but whose
/// acknowledgement was lost is sent again on the next attempt.
pub struct AlertNotifier {
    sink: Arc<dyn AlertSink>,
    policy: RetryPolicy,
    max_subject_len: usize,
}

impl AlertNotifier {
    pub fn new(sink: Arc<dyn AlertSink>, policy: RetryPolicy) -> Self {
        Self {
            sink,
            policy,
            max_subject_len: MAX_SUBJECT_LEN,
        }
    }

    /// Publish one alert, retrying transient failures
    ///
    /// # Errors
    ///
    /// Returns the last publish error once the policy's attempts are used up,
    /// or immediately when the sink rejects the request.
    pub async fn notify(&self, alert: &AlertEvent) -> Result<(), RetryError<ServiceError>> {
        let subject = Self::sanitize_subject(&alert.subject, self.max_subject_len);

        let result = retry(
            &self.policy,
            "publish alert",
            |_| self.sink.publish(&subject, &alert.message),
            ServiceError::classify,
        )
        .await;

        match &result {
            Ok(()) => info!("Sent alert: {}", subject),
            Err(e) => error!("Error sending alert {:?}: {}", subject, e),
        }
        result
    }

    /// Make a subject acceptable to the topic
    ///
    /// Line breaks and control characters are replaced with spaces, then the
    /// text is truncated on a UTF-8 boundary with a trailing "...".
    fn sanitize_subject(subject: &str, max_length: usize) -> String {
        let cleaned: String = subject
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        Self::truncate_text(cleaned.trim(), max_length)
    }

    /// Truncate text to at most `max_length` characters
    fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            return text.to_string();
        }

        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Writes metric samples to a [`MetricSink`] with bounded retry
pub struct MetricEmitter {
    sink: Arc<dyn MetricSink>,
    policy: RetryPolicy,
}

impl MetricEmitter {
    pub fn new(sink: Arc<dyn MetricSink>, policy: RetryPolicy) -> Self {
        Self { sink, policy }
    }

    /// Write one sample, retrying transient failures
    pub async fn emit(&self, sample: &MetricSample) -> Result<(), RetryError<ServiceError>> {
        retry(
            &self.policy,
            "put metric",
            |_| self.sink.put_metric(sample),
            ServiceError::classify,
        )
        .await
    }
}
