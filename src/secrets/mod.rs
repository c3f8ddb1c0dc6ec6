//! Credential resolution from the secret store
//!
//! The fetch is retried like any other external call. Parsing the payload
//! is not: a secret that exists but lacks the expected field will not fix
//! itself on a second read.

use crate::error::{SecretError, ServiceError};
use crate::retry::{retry, RetryPolicy};
use log::info;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// AWS Secrets Manager store
pub mod secrets_manager;

/// In-memory secret store for tests
pub mod mock;

pub use mock::MockSecretStore;
pub use secrets_manager::SecretsManagerStore;

/// Field holding the database password inside the secret payload
pub const PASSWORD_FIELD: &str = "password";

/// Trait for read-only secret stores
pub trait SecretStore: Send + Sync {
    /// Fetch the raw string payload of a secret
    fn secret_string<'a>(
        &'a self,
        secret_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ServiceError>> + Send + 'a>>;
}

/// Resolves named fields of JSON secrets with bounded retry on the fetch
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
    policy: RetryPolicy,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn SecretStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Resolve the database password held in `secret_id`
    pub async fn database_password(&self, secret_id: &str) -> Result<String, SecretError> {
        self.resolve_field(secret_id, PASSWORD_FIELD).await
    }

    /// Fetch `secret_id` and return its string field `field`
    ///
    /// # Errors
    ///
    /// * `SecretError::Fetch` when every fetch attempt failed (carries the
    ///   last error)
    /// * `SecretError::Malformed` when the payload is not a JSON object
    /// * `SecretError::MissingField` when the field is absent or not a string
    pub async fn resolve_field(
        &self,
        secret_id: &str,
        field: &'static str,
    ) -> Result<String, SecretError> {
        let payload = retry(
            &self.policy,
            "fetch secret",
            |_| self.store.secret_string(secret_id),
            ServiceError::classify,
        )
        .await
        .map_err(|source| SecretError::Fetch {
            secret_id: secret_id.to_string(),
            source,
        })?;

        let value = extract_field(secret_id, &payload, field)?;
        info!("Resolved field {:?} of secret {}", field, secret_id);
        Ok(value)
    }
}

/// Pull a string field out of a JSON object payload
fn extract_field(
    secret_id: &str,
    payload: &str,
    field: &'static str,
) -> Result<String, SecretError> {
    let object: Map<String, Value> =
        serde_json::from_str(payload).map_err(|e| SecretError::Malformed {
            secret_id: secret_id.to_string(),
            reason: e.to_string(),
        })?;

    match object.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(SecretError::MissingField {
            secret_id: secret_id.to_string(),
            field,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetryError;
    use std::time::Duration;

    const SECRET_ID: &str = "arn:aws:secretsmanager:eu-west-1:1:secret:replay-db";

    fn resolver(store: Arc<MockSecretStore>) -> CredentialResolver {
        CredentialResolver::new(store, RetryPolicy::fixed(3, Duration::from_millis(1)))
    }

    fn transient() -> ServiceError {
        ServiceError::Transient("endpoint timeout".to_string())
    }

    #[tokio::test]
    async fn test_resolves_password() {
        let store = Arc::new(MockSecretStore::with_payload(
            r#"{"username":"monitor","password":"s3cret"}"#,
        ));
        let password = resolver(store.clone())
            .database_password(SECRET_ID)
            .await
            .unwrap();

        assert_eq!(password, "s3cret");
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_retried_until_success() {
        let store = Arc::new(MockSecretStore::with_responses(vec![
            Err(transient()),
            Err(transient()),
            Ok(r#"{"password":"s3cret"}"#.to_string()),
        ]));
        let password = resolver(store.clone())
            .database_password(SECRET_ID)
            .await
            .unwrap();

        assert_eq!(password, "s3cret");
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_exhaustion_carries_last_error() {
        let store = Arc::new(MockSecretStore::with_responses(vec![
            Err(ServiceError::Transient("first".to_string())),
            Err(ServiceError::Transient("second".to_string())),
            Err(ServiceError::Transient("third".to_string())),
        ]));
        let result = resolver(store.clone()).database_password(SECRET_ID).await;

        assert_eq!(store.call_count(), 3);
        match result {
            Err(SecretError::Fetch {
                source: RetryError::Exhausted { attempts, last, .. },
                ..
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, ServiceError::Transient("third".to_string()));
            }
            other => panic!("expected fetch exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_password_is_fatal_and_not_retried() {
        let store = Arc::new(MockSecretStore::with_payload("{}"));
        let result = resolver(store.clone()).database_password(SECRET_ID).await;

        assert_eq!(store.call_count(), 1);
        assert_eq!(
            result,
            Err(SecretError::MissingField {
                secret_id: SECRET_ID.to_string(),
                field: "password",
            })
        );
    }

    #[tokio::test]
    async fn test_non_string_password_is_missing() {
        let store = Arc::new(MockSecretStore::with_payload(r#"{"password": 1234}"#));
        let result = resolver(store).database_password(SECRET_ID).await;
        assert!(matches!(result, Err(SecretError::MissingField { .. })));
    }

    #[tokio::test]
    async fn test_non_json_payload_is_malformed() {
        let store = Arc::new(MockSecretStore::with_payload("plain-text-password"));
        let result = resolver(store.clone()).database_password(SECRET_ID).await;

        assert_eq!(store.call_count(), 1);
        assert!(matches!(result, Err(SecretError::Malformed { .. })));
    }
}
