//! Remote markdown retrieval.

use std::future::Future;
use std::io;
use std::time::Duration;

use ureq::Agent;
use url::Url;

use crate::error::FetchError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Default cap on response bodies and `file://` reads (ureq's own default).
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// Response to a fetch: status code and body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] for any other status.
    pub fn into_success(self) -> Result<String, FetchError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                status: self.status,
            })
        }
    }
}

/// Retrieves markdown text by URL.
///
/// Non-2xx responses are returned as [`FetchResponse`]s; callers decide
/// what counts as failure.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport or I/O failure.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// [`Fetcher`] using a blocking `ureq` agent on tokio's blocking pool.
///
/// `file://` URLs are read from disk. Bodies larger than the body limit
/// (default [`DEFAULT_BODY_LIMIT`]) fail with [`FetchError::TooLarge`].
#[derive(Clone, Debug)]
pub struct UreqFetcher {
    agent: Agent,
    body_limit: u64,
}

impl UreqFetcher {
    /// Create a fetcher with a global request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Set the largest body accepted, in bytes.
    #[must_use]
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn body_limit(&self) -> u64 {
        self.body_limit
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT))
    }
}

impl Fetcher for UreqFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let url = url.clone();
        let limit = self.body_limit;
        if url.scheme() == "file" {
            return tokio::task::spawn_blocking(move || read_file(&url, limit)).await?;
        }

        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || get(&agent, &url, limit)).await?
    }
}

fn get(agent: &Agent, url: &Url, limit: u64) -> Result<FetchResponse, FetchError> {
    let response = agent.get(url.as_str()).call()?;
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .with_config()
        .limit(limit)
        .read_to_string()
        .map_err(|e| match e {
            ureq::Error::BodyExceedsLimit(_) => FetchError::TooLarge { limit },
            other => FetchError::Http(other),
        })?;
    tracing::debug!(%url, status, bytes = body.len(), "Fetched markdown");
    Ok(FetchResponse { status, body })
}

fn read_file(url: &Url, limit: u64) -> Result<FetchResponse, FetchError> {
    let path = url.to_file_path().map_err(|()| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a local file URL: {url}"),
        )
    })?;
    if std::fs::metadata(&path)?.len() > limit {
        return Err(FetchError::TooLarge { limit });
    }
    let body = std::fs::read_to_string(&path)?;
    tracing::debug!(path = %path.display(), bytes = body.len(), "Read markdown file");
    Ok(FetchResponse { status: 200, body })
}
