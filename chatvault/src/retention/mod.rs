pub mod archive;
pub mod lister;
pub mod paths;
pub mod pipeline;
pub mod retry;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("api error: {0}")]
    Api(#[from] chatvault_core::SlackError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("download failed: {0}")]
    Transfer(#[from] reqwest::Error),
    #[error("run cancelled")]
    Cancelled,
}
