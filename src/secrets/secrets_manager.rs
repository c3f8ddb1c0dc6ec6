use crate::aws::service_error;
use crate::error::ServiceError;
use crate::secrets::SecretStore;
use log::debug;
use std::future::Future;
use std::pin::Pin;

/// Reads secrets from AWS Secrets Manager
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_secretsmanager::Client::new(config))
    }
}

impl SecretStore for SecretsManagerStore {
    fn secret_string<'a>(
        &'a self,
        secret_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ServiceError>> + Send + 'a>> {
        Box::pin(async move {
            debug!("Calling GetSecretValue for {}", secret_id);

            let output = self
                .client
                .get_secret_value()
                .secret_id(secret_id)
                .send()
                .await
                .map_err(|e| service_error("Secrets Manager GetSecretValue", e))?;

            // Binary secrets have no string payload; nothing to retry
            output.secret_string().map(str::to_string).ok_or_else(|| {
                ServiceError::Rejected(format!("secret {} has no string payload", secret_id))
            })
        })
    }
}
