use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::RetentionError;

/// Runs a remote call until it succeeds or fails with something other than
/// a rate limit. The wait between attempts is the server-advertised
/// interval; cancellation is the only bound on the loop.
pub async fn with_rate_limit_retry<T, F, Fut>(
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetentionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetentionError>>,
{
    loop {
        match op().await {
            Err(RetentionError::Api(err)) => match err.retry_after() {
                Some(retry_after) => {
                    debug!(wait_secs = retry_after.as_secs(), "rate limited, backing off");
                    wait_or_cancel(cancel, retry_after).await?;
                }
                None => return Err(RetentionError::Api(err)),
            },
            other => return other,
        }
    }
}

async fn wait_or_cancel(cancel: &CancellationToken, wait: Duration) -> Result<(), RetentionError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RetentionError::Cancelled),
        _ = tokio::time::sleep(wait) => Ok(()),
    }
}
