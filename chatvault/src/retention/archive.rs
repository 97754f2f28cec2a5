use std::path::{Path, PathBuf};

use chatvault_core::{RemoteFile, SlackClient};
use futures_util::StreamExt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::RetentionError;
use super::paths::archive_path_for;
use super::retry::with_rate_limit_retry;

#[derive(Debug, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Stored(PathBuf),
    /// The platform exposes no content for this file; there is nothing to
    /// copy and the caller may proceed to deletion.
    NoContent,
}

pub struct FileArchiver {
    client: SlackClient,
    root: PathBuf,
}

impl FileArchiver {
    pub fn new(client: SlackClient, root: PathBuf) -> Self {
        Self { client, root }
    }

    pub async fn archive(
        &self,
        file: &RemoteFile,
        cancel: &CancellationToken,
    ) -> Result<ArchiveOutcome, RetentionError> {
        if file.url_private_download.is_empty() {
            debug!(file_id = %file.id, "download url is empty, nothing to archive");
            return Ok(ArchiveOutcome::NoContent);
        }

        let target = archive_path_for(&self.root, file);
        let owner = user_label(&self.client, &file.user).await;
        debug!(
            file_id = %file.id,
            user = %owner,
            name = %file.name,
            created = %format_created(file.created),
            path = %target.display(),
            "archiving file"
        );

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let target_ref = target.as_path();
        with_rate_limit_retry(cancel, || self.store(file, target_ref)).await?;
        Ok(ArchiveOutcome::Stored(target))
    }

    // Each attempt recreates the target, so a rate-limited fetch restarts
    // against a truncated file.
    async fn store(&self, file: &RemoteFile, target: &Path) -> Result<(), RetentionError> {
        let mut out = File::create(target).await?;
        let response = self.client.fetch_file(&file.url_private_download).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            out.write_all(&chunk?).await?;
        }
        out.flush().await?;
        out.sync_all().await?;
        Ok(())
    }
}

/// Best-effort owner label for the archive log line; lookup failures
/// degrade to a sentinel instead of entering the error path.
pub async fn user_label(client: &SlackClient, user_id: &str) -> String {
    match client.user_display_name(user_id).await {
        Ok(name) => name,
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "failed to resolve user");
            "user-lookup-failed".to_string()
        }
    }
}

fn format_created(created: i64) -> String {
    OffsetDateTime::from_unix_timestamp(created)
        .ok()
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| created.to_string())
}
