use chatvault_core::{RemoteFile, SlackClient};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::RetentionError;
use super::retry::with_rate_limit_retry;

/// Walks the file listing to completion. The cutoff filter is applied
/// server-side; pages are requested 1..=pages as reported by the response,
/// so an empty workspace still costs exactly one request.
pub async fn list_expired_files(
    client: &SlackClient,
    cutoff_ts: i64,
    page_size: u32,
    cancel: &CancellationToken,
) -> Result<Vec<RemoteFile>, RetentionError> {
    let mut files = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = with_rate_limit_retry(cancel, || async move {
            Ok(client.list_files(cutoff_ts, page_size, page).await?)
        })
        .await?;
        let pages = batch.paging.pages;
        debug!(page, pages, fetched = batch.files.len(), "fetched listing page");
        files.extend(batch.files);
        page += 1;
        if page > pages {
            break;
        }
    }
    Ok(files)
}
