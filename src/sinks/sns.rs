use crate::aws::service_error;
use crate::error::ServiceError;
use crate::sinks::AlertSink;
use log::debug;
use std::future::Future;
use std::pin::Pin;

/// Publishes alerts to one SNS topic
pub struct SnsAlertSink {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsAlertSink {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }

    pub fn from_config(config: &aws_config::SdkConfig, topic_arn: String) -> Self {
        Self::new(aws_sdk_sns::Client::new(config), topic_arn)
    }
}

impl AlertSink for SnsAlertSink {
    fn publish<'a>(
        &'a self,
        subject: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'a>> {
        Box::pin(async move {
            let output = self
                .client
                .publish()
                .topic_arn(&self.topic_arn)
                .subject(subject)
                .message(message)
                .send()
                .await
                .map_err(|e| service_error("SNS Publish", e))?;

            debug!(
                "Published {:?} to {} as message {}",
                subject,
                self.topic_arn,
                output.message_id().unwrap_or("<none>")
            );
            Ok(())
        })
    }
}
