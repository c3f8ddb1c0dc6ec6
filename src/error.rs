use crate::retry::Classification;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while validating a flag or environment value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("value must not be blank")]
    Blank,

    #[error("{value:?} is not an http(s) URL: {reason}")]
    InvalidUrl { value: String, reason: String },
}

/// Errors raised by a probe's single external read
///
/// None of these are retried: a probe failure aborts the invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("HTTP request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Failed to decode connector status body: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors returned by external write-type services (alert topic, metrics
/// backend, secret store)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Network hiccup, throttling or a 5xx from the service
    #[error("Transient service failure: {0}")]
    Transient(String),

    /// The service refused the request itself; repeating it will not help
    #[error("Request rejected by service: {0}")]
    Rejected(String),
}

impl ServiceError {
    /// Retry classification used by every call site that talks to a service
    pub fn classify(&self) -> Classification {
        match self {
            ServiceError::Transient(_) => Classification::Retryable,
            ServiceError::Rejected(_) => Classification::Fatal,
        }
    }
}

/// Terminal outcome of a retried operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetryError<E: std::error::Error + 'static> {
    #[error("{operation} failed after {attempts} attempts: {last}")]
    Exhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: E,
    },

    #[error("{operation} failed on attempt {attempt} with a non-retryable error: {error}")]
    Fatal {
        operation: String,
        attempt: u32,
        #[source]
        error: E,
    },
}

impl<E: std::error::Error + 'static> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Fatal { attempt, .. } => *attempt,
        }
    }

    /// The last error observed
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Fatal { error, .. } => error,
        }
    }
}

/// Errors that can occur while resolving a credential from the secret store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SecretError {
    #[error("Failed to fetch secret {secret_id}: {source}")]
    Fetch {
        secret_id: String,
        #[source]
        source: RetryError<ServiceError>,
    },

    #[error("Secret {secret_id} is not a JSON object: {reason}")]
    Malformed { secret_id: String, reason: String },

    #[error("Secret {secret_id} has no string field {field:?}")]
    MissingField {
        secret_id: String,
        field: &'static str,
    },
}

/// Errors that end a single invocation of a monitoring job
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Failed to publish alert {subject:?}: {source}")]
    Alert {
        subject: String,
        #[source]
        source: RetryError<ServiceError>,
    },

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("Invocation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_classification() {
        assert_eq!(
            ServiceError::Transient("timeout".to_string()).classify(),
            Classification::Retryable
        );
        assert_eq!(
            ServiceError::Rejected("InvalidParameter".to_string()).classify(),
            Classification::Fatal
        );
    }

    #[test]
    fn test_retry_error_accessors() {
        let exhausted = RetryError::Exhausted {
            operation: "publish alert".to_string(),
            attempts: 3,
            last: ServiceError::Transient("third".to_string()),
        };
        assert_eq!(exhausted.attempts(), 3);
        assert_eq!(
            exhausted.last_error(),
            &ServiceError::Transient("third".to_string())
        );
        assert!(exhausted.to_string().contains("after 3 attempts"));

        let fatal = RetryError::Fatal {
            operation: "fetch secret".to_string(),
            attempt: 1,
            error: ServiceError::Rejected("AccessDenied".to_string()),
        };
        assert_eq!(fatal.attempts(), 1);
        assert!(fatal.to_string().contains("non-retryable"));
    }

    #[test]
    fn test_secret_errors_are_distinguishable() {
        let missing = SecretError::MissingField {
            secret_id: "db-secret".to_string(),
            field: "password",
        };
        let fetch = SecretError::Fetch {
            secret_id: "db-secret".to_string(),
            source: RetryError::Exhausted {
                operation: "fetch secret".to_string(),
                attempts: 3,
                last: ServiceError::Transient("timeout".to_string()),
            },
        };
        assert_ne!(missing, fetch);
        assert!(missing.to_string().contains("\"password\""));
    }
}
