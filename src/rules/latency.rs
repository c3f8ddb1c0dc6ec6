//! Latency rule for replay samples
//!
//! Every sample becomes exactly one metric; there is no threshold here.
//! Anomaly detection is left to the metrics backend.

use crate::events::{Dimension, MetricSample, ReplaySample};

/// CloudWatch namespace receiving replay metrics
pub const METRIC_NAMESPACE: &str = "ReplayServiceCustomMetrics";

/// Name of the per-round latency metric
pub const METRIC_NAME: &str = "response.time.per.roundId";

pub const UNIT_SECONDS: &str = "Seconds";

/// Dimension tagging each sample with its round
pub const ROUND_ID_DIMENSION: &str = "RoundId";

/// Build the latency metric for one sample
pub fn latency_metric(sample: &ReplaySample) -> MetricSample {
    MetricSample {
        name: METRIC_NAME.to_string(),
        value: sample.duration_seconds(),
        unit: UNIT_SECONDS.to_string(),
        dimensions: vec![Dimension {
            name: ROUND_ID_DIMENSION.to_string(),
            value: sample.round_id.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_latency_metric() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let sample = ReplaySample {
            round_id: 1234,
            created_at: created,
            inserted_at: created + Duration::milliseconds(1_250),
        };

        let metric = latency_metric(&sample);

        assert_eq!(metric.name, "response.time.per.roundId");
        assert_eq!(metric.unit, "Seconds");
        assert_eq!(metric.value, 1.25);
        assert_eq!(
            metric.dimensions,
            vec![Dimension {
                name: "RoundId".to_string(),
                value: "1234".to_string(),
            }]
        );
    }

    #[test]
    fn test_negative_latency_is_emitted_as_is() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let sample = ReplaySample {
            round_id: 1,
            created_at: created,
            inserted_at: created - Duration::seconds(2),
        };
        assert_eq!(latency_metric(&sample).value, -2.0);
    }
}
