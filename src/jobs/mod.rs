//! The two scheduled pipelines: probe, evaluate, then notify or emit

use crate::error::RunError;
use std::future::Future;
use std::time::Duration;

pub mod connector_status;
pub mod replay_duration;

pub use connector_status::{ConnectorRunSummary, ConnectorStatusJob};
pub use replay_duration::{ReplayDurationJob, ReplayRunSummary};

/// Bound a whole invocation by an optional deadline
///
/// Expiry drops the in-flight future, so a pending retry sleep is cancelled
/// along with it.
pub async fn with_deadline<T, Fut>(deadline: Option<Duration>, run: Fut) -> Result<T, RunError>
where
    Fut: Future<Output = Result<T, RunError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| RunError::DeadlineExceeded(limit))?,
        None => run.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_not_reached() {
        let result = with_deadline(Some(Duration::from_secs(5)), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, RunError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let result = with_deadline(Some(Duration::from_secs(2)), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, RunError>(())
        })
        .await;
        assert!(matches!(
            result,
            Err(RunError::DeadlineExceeded(limit)) if limit == Duration::from_secs(2)
        ));
    }

    #[tokio::test]
    async fn test_no_deadline_passes_errors_through() {
        let result: Result<(), _> = with_deadline(None, async {
            Err(RunError::DeadlineExceeded(Duration::from_secs(1)))
        })
        .await;
        assert!(result.is_err());
    }
}
