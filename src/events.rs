//! Core data types shared by the connector-status and replay-duration jobs
//!
//! Reports decoded from probes are read-only after construction; alerts and
//! metric samples are ephemeral values built by the rules and consumed once
//! by the notifier or emitter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// Task state reported by a healthy connector task
pub const RUNNING: &str = "RUNNING";

/// Status document returned by `GET /connectors/{name}/status`
///
/// Every field defaults when absent, so error documents returned alongside a
/// non-200 status still decode (with no tasks).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectorStatusReport {
    /// Connector name as reported by the worker
    #[serde(default)]
    pub name: String,
    /// State of the connector itself
    #[serde(default)]
    pub connector: ConnectorState,
    /// Tasks in the order the worker reported them
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
    /// Connector type, e.g. "sink" or "source"
    #[serde(default, rename = "type")]
    pub connector_type: String,
}

/// Connector-level state block of a status report
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectorState {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub worker_id: String,
}

/// One task belonging to a connector
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub worker_id: String,
}

impl TaskStatus {
    /// Whether the task is in the literal `RUNNING` state
    pub fn is_running(&self) -> bool {
        self.state == RUNNING
    }
}

/// One processed round interaction read from the database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReplaySample {
    pub round_id: i64,
    /// When the round was created upstream
    pub created_at: Timestamp,
    /// When the round landed in the database
    pub inserted_at: Timestamp,
}

impl ReplaySample {
    /// Elapsed seconds between creation and insertion
    ///
    /// Negative when `inserted_at` precedes `created_at`; the value is never
    /// clamped so clock or ordering anomalies stay visible.
    pub fn duration_seconds(&self) -> f64 {
        let elapsed = self.inserted_at - self.created_at;
        match elapsed.num_nanoseconds() {
            Some(nanos) => nanos as f64 / 1e9,
            None => elapsed.num_milliseconds() as f64 / 1e3,
        }
    }
}

/// Alert to be published to the notification topic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AlertEvent {
    pub subject: String,
    pub message: String,
}

impl AlertEvent {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Name/value pair attached to a metric sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// One data point destined for the metrics backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Empty when the sample carries no dimensions
    pub dimensions: Vec<Dimension>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_decode_connector_status_report() {
        let body = r#"{
            "name": "JdbcSinkRoundInteractions",
            "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
            "tasks": [
                {"id": 0, "state": "RUNNING", "worker_id": "10.0.0.1:8083"},
                {"id": 1, "state": "FAILED", "worker_id": "10.0.0.2:8083", "trace": "boom"}
            ],
            "type": "sink"
        }"#;

        let report: ConnectorStatusReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.name, "JdbcSinkRoundInteractions");
        assert_eq!(report.connector.state, "RUNNING");
        assert_eq!(report.connector.worker_id, "10.0.0.1:8083");
        assert_eq!(report.connector_type, "sink");
        assert_eq!(report.tasks.len(), 2);
        assert!(report.tasks[0].is_running());
        assert!(!report.tasks[1].is_running());
        assert_eq!(report.tasks[1].id, 1);
    }

    #[test]
    fn test_decode_error_document_defaults_fields() {
        let body = r#"{"error_code": 503, "message": "worker unavailable"}"#;
        let report: ConnectorStatusReport = serde_json::from_str(body).unwrap();
        assert_eq!(report, ConnectorStatusReport::default());
        assert!(report.tasks.is_empty());
    }

    #[test]
    fn test_task_state_match_is_exact() {
        let task = TaskStatus {
            id: 0,
            state: "running".to_string(),
            worker_id: String::new(),
        };
        assert!(!task.is_running());
    }

    #[test]
    fn test_duration_seconds() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let sample = ReplaySample {
            round_id: 42,
            created_at: created,
            inserted_at: created + Duration::milliseconds(2_500),
        };
        assert_eq!(sample.duration_seconds(), 2.5);
    }

    #[test]
    fn test_negative_duration_is_not_clamped() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let sample = ReplaySample {
            round_id: 7,
            created_at: created,
            inserted_at: created - Duration::seconds(3),
        };
        assert_eq!(sample.duration_seconds(), -3.0);
    }
}
