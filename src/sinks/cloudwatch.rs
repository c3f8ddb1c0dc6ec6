use crate::aws::service_error;
use crate::error::ServiceError;
use crate::events::MetricSample;
use crate::sinks::MetricSink;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use std::future::Future;
use std::pin::Pin;

/// Writes metric samples to one CloudWatch namespace
///
/// Dimensions are only sent when enabled: a dimensioned datum is a different
/// CloudWatch metric from the undimensioned one existing alarms watch.
pub struct CloudWatchMetricSink {
    client: aws_sdk_cloudwatch::Client,
    namespace: String,
    publish_dimensions: bool,
}

impl CloudWatchMetricSink {
    pub fn new(client: aws_sdk_cloudwatch::Client, namespace: String) -> Self {
        Self {
            client,
            namespace,
            publish_dimensions: false,
        }
    }

    pub fn from_config(config: &aws_config::SdkConfig, namespace: String) -> Self {
        Self::new(aws_sdk_cloudwatch::Client::new(config), namespace)
    }

    pub fn with_dimensions(mut self, publish_dimensions: bool) -> Self {
        self.publish_dimensions = publish_dimensions;
        self
    }

    fn datum(&self, sample: &MetricSample) -> MetricDatum {
        let mut datum = MetricDatum::builder()
            .metric_name(&sample.name)
            .value(sample.value)
            .unit(StandardUnit::from(sample.unit.as_str()));

        if self.publish_dimensions {
            for dimension in &sample.dimensions {
                datum = datum.dimensions(
                    Dimension::builder()
                        .name(&dimension.name)
                        .value(&dimension.value)
                        .build(),
                );
            }
        }

        datum.build()
    }
}

impl MetricSink for CloudWatchMetricSink {
    fn put_metric<'a>(
        &'a self,
        sample: &'a MetricSample,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'a>> {
        Box::pin(async move {
            let datum = self.datum(sample);

            self.client
                .put_metric_data()
                .namespace(&self.namespace)
                .metric_data(datum)
                .send()
                .await
                .map_err(|e| service_error("CloudWatch PutMetricData", e))?;

            Ok(())
        })
    }
}
