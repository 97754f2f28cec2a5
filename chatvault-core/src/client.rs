use std::time::{Duration, SystemTime};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://slack.com";
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("rate limited for {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },
    #[error("api returned {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("api call failed: {0}")]
    Api(String),
}

impl SlackError {
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SlackError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Result<Self, SlackError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, SlackError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            token: token.into(),
        })
    }

    pub async fn list_files(
        &self,
        ts_to: i64,
        count: u32,
        page: u32,
    ) -> Result<FileListPage, SlackError> {
        let mut url = self.endpoint("/api/files.list")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ts_to", &ts_to.to_string());
            query.append_pair("count", &count.to_string());
            query.append_pair("page", &page.to_string());
            query.append_pair("show_files_hidden_by_limit", "true");
        }
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn delete_file(&self, id: &str) -> Result<(), SlackError> {
        let url = self.endpoint("/api/files.delete")?;
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .form(&[("file", id)])
            .send()
            .await?;
        let _: Deleted = Self::handle_response(response).await?;
        Ok(())
    }

    pub async fn user_display_name(&self, user_id: &str) -> Result<String, SlackError> {
        let mut url = self.endpoint("/api/users.info")?;
        url.query_pairs_mut().append_pair("user", user_id);
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        let payload: UserResponse = Self::handle_response(response).await?;
        Ok(payload.user.name)
    }

    /// Authorized GET of a download locator; the body is left unread so the
    /// caller can stream it.
    pub async fn fetch_file(&self, url: &str) -> Result<reqwest::Response, SlackError> {
        let url = Url::parse(url)?;
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SlackError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Http { status, body });
        }
        Ok(response)
    }

    fn auth_header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, SlackError> {
        Ok(self.base_url.join(path)?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SlackError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SlackError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Http { status, body });
        }
        let envelope: Envelope<T> = response.json().await?;
        if !envelope.ok {
            return Err(SlackError::Api(
                envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(envelope.payload)
    }
}

// Retry-After is delta-seconds or an HTTP-date; a bare 429 still has to
// produce a usable wait.
fn parse_retry_after(headers: &HeaderMap) -> Duration {
    let Some(value) = headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()) else {
        return DEFAULT_RETRY_AFTER;
    };
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds);
    }
    if let Ok(at) = httpdate::parse_http_date(value) {
        return at
            .duration_since(SystemTime::now())
            .unwrap_or(DEFAULT_RETRY_AFTER);
    }
    DEFAULT_RETRY_AFTER
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user: String,
    pub created: i64,
    #[serde(default)]
    pub url_private_download: String,
    #[serde(default)]
    pub mode: String,
}

impl RemoteFile {
    pub fn is_hidden_by_limit(&self) -> bool {
        self.mode == "hidden_by_limit"
    }
}

#[derive(Debug, Deserialize)]
pub struct FileListPage {
    pub files: Vec<RemoteFile>,
    pub paging: Paging,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u32,
    pub page: u32,
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
struct Deleted {}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    name: String,
}
