//! Shared AWS SDK plumbing
//!
//! Region and credentials come from the standard provider chain. SDK errors
//! are folded into [`ServiceError`] so the retry layer can classify them.

use crate::error::ServiceError;
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Error codes for which repeating the request cannot succeed
const REJECTED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AuthorizationError",
    "InvalidParameter",
    "InvalidParameterCombination",
    "InvalidParameterException",
    "InvalidParameterValue",
    "InvalidRequestException",
    "MissingParameter",
    "NotFound",
    "ResourceNotFoundException",
];

/// Load SDK configuration from the environment
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await
}

/// Classify an SDK error as transient or rejected
pub(crate) fn service_error<E, R>(operation: &str, err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = format!("{}: {}", operation, DisplayErrorContext(&err));

    match &err {
        SdkError::ConstructionFailure(_) => ServiceError::Rejected(detail),
        SdkError::ServiceError(_) => match err.code() {
            Some(code) if REJECTED_CODES.contains(&code) => ServiceError::Rejected(detail),
            _ => ServiceError::Transient(detail),
        },
        // Timeouts, dispatch failures and unparseable responses
        _ => ServiceError::Transient(detail),
    }
}
