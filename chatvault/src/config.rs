use std::path::PathBuf;

use anyhow::Context;

const TOKEN_VAR: &str = "CHATVAULT_TOKEN";
const DEFAULT_ARCHIVE_DIR: &str = "files";
const DEFAULT_RETENTION_DAYS: u64 = 90;
const DEFAULT_PAGE_SIZE: u64 = 100;

#[derive(Clone, Debug)]
pub struct RetentionConfig {
    pub token: String,
    pub archive_root: PathBuf,
    pub retention_days: u64,
    pub page_size: u32,
}

impl RetentionConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var(TOKEN_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .with_context(|| format!("{TOKEN_VAR} env var must be set"))?;
        let archive_root = std::env::var("CHATVAULT_ARCHIVE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARCHIVE_DIR));
        let retention_days = read_u64_env("CHATVAULT_RETENTION_DAYS", DEFAULT_RETENTION_DAYS);
        let page_size = read_u64_env("CHATVAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE) as u32;

        Ok(Self {
            token,
            archive_root,
            retention_days,
            page_size,
        })
    }
}

fn read_u64_env(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
