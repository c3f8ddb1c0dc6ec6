use crate::error::ServiceError;
use crate::secrets::SecretStore;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Mock secret store for testing
///
/// Responses are returned in order; the last one repeats once the list is
/// exhausted.
pub struct MockSecretStore {
    responses: Vec<Result<String, ServiceError>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSecretStore {
    pub fn with_responses(responses: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            responses,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Always return `payload`
    pub fn with_payload(payload: &str) -> Self {
        Self::with_responses(vec![Ok(payload.to_string())])
    }

    /// Always fail with `error`
    pub fn error(error: ServiceError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Get the number of times the secret was fetched
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl SecretStore for MockSecretStore {
    fn secret_string<'a>(
        &'a self,
        secret_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ServiceError>> + Send + 'a>> {
        Box::pin(async move {
            let mut count = self.call_count.lock().unwrap();
            let index = (*count).min(self.responses.len().saturating_sub(1));
            *count += 1;

            match self.responses.get(index) {
                Some(response) => response.clone(),
                None => Err(ServiceError::Rejected(format!(
                    "secret {} not found",
                    secret_id
                ))),
            }
        })
    }
}
