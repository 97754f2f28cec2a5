use std::path::PathBuf;

use chatvault_core::SlackClient;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::RetentionError;
use super::archive::{ArchiveOutcome, FileArchiver};
use super::lister::list_expired_files;
use super::retry::with_rate_limit_retry;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Default, Clone, Copy)]
pub struct RunReport {
    pub listed: usize,
    pub archived: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub archive_failures: usize,
    pub delete_failures: usize,
}

pub struct RetentionPipeline {
    client: SlackClient,
    archiver: FileArchiver,
    retention_days: u64,
    page_size: u32,
}

impl RetentionPipeline {
    pub fn new(
        client: SlackClient,
        archive_root: PathBuf,
        retention_days: u64,
        page_size: u32,
    ) -> Self {
        Self {
            archiver: FileArchiver::new(client.clone(), archive_root),
            client,
            retention_days,
            page_size,
        }
    }

    /// One retention pass: list everything older than the window, then
    /// archive-and-delete each file. A file is only deleted after a
    /// confirmed local copy or an explicit decision that no copy is
    /// possible; per-file failures never abort the run.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunReport, RetentionError> {
        let cutoff = OffsetDateTime::now_utc().unix_timestamp()
            - self.retention_days as i64 * SECONDS_PER_DAY;
        let files = list_expired_files(&self.client, cutoff, self.page_size, cancel).await?;

        let mut report = RunReport {
            listed: files.len(),
            ..RunReport::default()
        };
        if files.is_empty() {
            info!(
                retention_days = self.retention_days,
                "found no files older than the retention window"
            );
            return Ok(report);
        }
        info!(count = files.len(), "found files for deletion");

        for file in &files {
            if file.is_hidden_by_limit() {
                info!(
                    file_id = %file.id,
                    "content withheld by quota limit, deleting without a local copy"
                );
                report.skipped += 1;
            } else {
                match self.archiver.archive(file, cancel).await {
                    Ok(ArchiveOutcome::Stored(path)) => {
                        debug!(file_id = %file.id, path = %path.display(), "archived file");
                        report.archived += 1;
                    }
                    Ok(ArchiveOutcome::NoContent) => {
                        report.skipped += 1;
                    }
                    Err(RetentionError::Cancelled) => return Err(RetentionError::Cancelled),
                    Err(err) => {
                        warn!(
                            file_id = %file.id,
                            error = %err,
                            "failed to archive, keeping the remote copy"
                        );
                        report.archive_failures += 1;
                        continue;
                    }
                }
            }

            let client = &self.client;
            let file_id = file.id.as_str();
            let deleted = with_rate_limit_retry(cancel, || async move {
                Ok(client.delete_file(file_id).await?)
            })
            .await;
            match deleted {
                Ok(()) => {
                    debug!(file_id = %file.id, "deleted remote file");
                    report.deleted += 1;
                }
                Err(RetentionError::Cancelled) => return Err(RetentionError::Cancelled),
                Err(err) => {
                    warn!(file_id = %file.id, error = %err, "failed to delete remote file");
                    report.delete_failures += 1;
                }
            }
        }

        Ok(report)
    }
}
