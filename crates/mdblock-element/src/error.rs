//! Error types for markdown elements.

use mdblock_renderer::ParseError;

/// Error from a render pass.
///
/// Parsing and sanitization failures are returned to whoever triggered the
/// render; the host keeps its previous output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The parsing engine rejected the content.
    #[error("markdown parsing failed")]
    Parse(#[from] ParseError),

    /// The sanitizer failed (including its one-time initialization).
    #[error("sanitization failed")]
    Sanitize(#[from] SanitizeError),
}

/// Error from a [`Sanitizer`](crate::Sanitizer).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SanitizeError {
    /// Sanitizer policy could not be set up.
    #[error("sanitizer initialization failed: {0}")]
    Init(String),
}

/// Error fetching remote markdown.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// Reading a `file://` source failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Body exceeds the fetcher's limit.
    #[error("response body exceeds {limit} bytes")]
    TooLarge {
        /// Limit in bytes.
        limit: u64,
    },

    /// Server responded with a non-2xx status.
    #[error("HTTP error: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The blocking fetch task panicked or was cancelled.
    #[error("fetch task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// A rejected attribute or configuration value.
///
/// Never surfaced to users: elements log it at debug level and keep their
/// previous state.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// `src` could not be resolved to a URL.
    #[error("invalid URL `{value}`")]
    InvalidUrl {
        value: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// `hmin` is not a positive integer.
    #[error("invalid heading level `{0}`")]
    InvalidHeadingLevel(String),

    /// The attribute is not observed by the element.
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
}

/// The [`ElementRuntime`](crate::ElementRuntime) behind a handle is gone.
#[derive(Debug, thiserror::Error)]
#[error("element runtime has shut down")]
pub struct RuntimeClosed;
