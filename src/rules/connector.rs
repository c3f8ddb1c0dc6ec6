//! Health rules for connector status responses
//!
//! Rules are pure: the same response always yields the same alerts. The
//! status-code rule and the task-state rule are independent and can both
//! fire for one connector in the same pass.

use crate::error::ProbeError;
use crate::events::{AlertEvent, ConnectorStatusReport};
use crate::probes::StatusResponse;
use log::debug;

/// Trait for implementing connector health rules
pub trait HealthRule: Send + Sync {
    /// Alerts raised for one probed connector
    ///
    /// `report` is `None` when the body could not be decoded.
    fn evaluate(
        &self,
        response: &StatusResponse,
        report: Option<&ConnectorStatusReport>,
    ) -> Vec<AlertEvent>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;
}

/// Fires when the status endpoint answers with anything other than 200
pub struct StatusCodeRule;

impl HealthRule for StatusCodeRule {
    fn evaluate(
        &self,
        response: &StatusResponse,
        _report: Option<&ConnectorStatusReport>,
    ) -> Vec<AlertEvent> {
        if response.status == 200 {
            return Vec::new();
        }

        vec![AlertEvent::new(
            format!("{} Status Alert: Unexpected HTTP Status", response.connector),
            format!(
                "The {} status endpoint returned {} status code. Please check the connector and investigate the issue.",
                response.connector, response.status
            ),
        )]
    }

    fn name(&self) -> &str {
        "StatusCodeRule"
    }
}

/// Fires once per task whose state is not `RUNNING`
pub struct TaskStateRule;

impl HealthRule for TaskStateRule {
    fn evaluate(
        &self,
        _response: &StatusResponse,
        report: Option<&ConnectorStatusReport>,
    ) -> Vec<AlertEvent> {
        let Some(report) = report else {
            return Vec::new();
        };

        report
            .tasks
            .iter()
            .filter(|task| !task.is_running())
            .map(|task| {
                AlertEvent::new(
                    format!(
                        "Connector: {}, Task ID: {}, Current State: {}",
                        report.name, task.id, task.state
                    ),
                    format!(
                        "One or more tasks in '{}' are in a state other than 'RUNNING'.",
                        report.name
                    ),
                )
            })
            .collect()
    }

    fn name(&self) -> &str {
        "TaskStateRule"
    }
}

/// Outcome of evaluating one status response
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorEvaluation {
    /// Alerts in dispatch order
    pub alerts: Vec<AlertEvent>,
    /// Decoded report, when the body was valid JSON
    pub report: Option<ConnectorStatusReport>,
    /// Set when the body could not be decoded; the caller dispatches
    /// `alerts` first and then fails the invocation
    pub decode_error: Option<ProbeError>,
}

/// Ordered set of health rules applied to each status response
pub struct ConnectorRules {
    rules: Vec<Box<dyn HealthRule>>,
}

impl Default for ConnectorRules {
    /// Status-code rule followed by task-state rule
    fn default() -> Self {
        let mut rules = Self::new();
        rules.add_rule(Box::new(StatusCodeRule));
        rules.add_rule(Box::new(TaskStateRule));
        rules
    }
}

impl ConnectorRules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn HealthRule>) {
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Decode the body and run every rule against the response
    pub fn evaluate(&self, response: &StatusResponse) -> ConnectorEvaluation {
        let (report, decode_error) = match decode_report(&response.body) {
            Ok(report) => (Some(report), None),
            Err(error) => (None, Some(error)),
        };

        let alerts = self
            .rules
            .iter()
            .flat_map(|rule| {
                let alerts = rule.evaluate(response, report.as_ref());
                if !alerts.is_empty() {
                    debug!(
                        "{} raised {} alert(s) for {}",
                        rule.name(),
                        alerts.len(),
                        response.connector
                    );
                }
                alerts
            })
            .collect();

        ConnectorEvaluation {
            alerts,
            report,
            decode_error,
        }
    }
}

/// Decode a status body into a report
pub fn decode_report(body: &str) -> Result<ConnectorStatusReport, ProbeError> {
    serde_json::from_str(body).map_err(|e| ProbeError::Decode(e.to_string()))
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::events::{ConnectorState, TaskStatus};
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    /// Arbitrary probe outcome with a well-formed body
    #[derive(Debug, Clone)]
    struct ProbeOutcome {
        status: u16,
        report: ConnectorStatusReport,
    }

    impl Arbitrary for ProbeOutcome {
        fn arbitrary(g: &mut Gen) -> Self {
            let statuses = [200u16, 200, 200, 201, 404, 409, 500, 503];
            let states = ["RUNNING", "RUNNING", "FAILED", "PAUSED", "UNASSIGNED", "running"];

            let task_count = usize::from(u8::arbitrary(g) % 6);
            let tasks = (0..task_count)
                .map(|id| TaskStatus {
                    id: id as i64,
                    state: g.choose(&states).unwrap().to_string(),
                    worker_id: format!("worker-{}", id),
                })
                .collect();

            Self {
                status: *g.choose(&statuses).unwrap(),
                report: ConnectorStatusReport {
                    name: format!("connector-{}", u8::arbitrary(g)),
                    connector: ConnectorState {
                        state: "RUNNING".to_string(),
                        worker_id: "worker-0".to_string(),
                    },
                    tasks,
                    connector_type: "sink".to_string(),
                },
            }
        }
    }

    impl ProbeOutcome {
        fn response(&self) -> StatusResponse {
            StatusResponse::new(
                self.report.name.clone(),
                self.status,
                serde_json::to_string(&self.report).unwrap(),
            )
        }
    }

    // Alert count = non-RUNNING tasks + (1 if status != 200)
    #[quickcheck]
    fn prop_alert_count(outcome: ProbeOutcome) -> bool {
        let evaluation = ConnectorRules::default().evaluate(&outcome.response());

        let failing_tasks = outcome
            .report
            .tasks
            .iter()
            .filter(|task| task.state != "RUNNING")
            .count();
        let status_alerts = usize::from(outcome.status != 200);

        evaluation.decode_error.is_none()
            && evaluation.alerts.len() == failing_tasks + status_alerts
    }

    // A non-200 status always yields exactly one alert naming connector and code
    #[quickcheck]
    fn prop_status_alert_names_connector_and_code(outcome: ProbeOutcome) -> bool {
        let evaluation = ConnectorRules::default().evaluate(&outcome.response());
        let code = outcome.status.to_string();

        let matching = evaluation
            .alerts
            .iter()
            .filter(|alert| alert.subject.contains("Unexpected HTTP Status"))
            .filter(|alert| {
                alert.subject.contains(&outcome.report.name) && alert.message.contains(&code)
            })
            .count();

        matching == usize::from(outcome.status != 200)
    }

    // Evaluating the same response twice yields identical results
    #[quickcheck]
    fn prop_evaluation_is_idempotent(outcome: ProbeOutcome) -> bool {
        let rules = ConnectorRules::default();
        let response = outcome.response();
        rules.evaluate(&response) == rules.evaluate(&response)
    }
}
