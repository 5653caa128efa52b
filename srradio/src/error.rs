//! Error types for the Sveriges Radio client

use reqwest::StatusCode;

/// Result type alias for Sveriges Radio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Sveriges Radio client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upstream API could not be reached (connection, timeout, transport)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    /// The upstream API answered with a non-success status
    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: StatusCode, url: String },

    /// The upstream body is not valid JSON for the expected shape
    #[error("Malformed upstream body from {url}: {source}")]
    MalformedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Fetching the playlist of one channel failed
    #[error("Channel {channel} fetch failed: {source}")]
    ChannelFetch {
        channel: i64,
        #[source]
        source: Box<Error>,
    },

    /// The playlist of every channel failed
    #[error("All {channels} channel fetches failed, last error: {source}")]
    AllChannelsFailed {
        channels: usize,
        #[source]
        source: Box<Error>,
    },

    /// The request path is not a relative URI
    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[source] reqwest::Error),

    /// Configuration error (from srconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// `true` when the upstream fetch failed, whatever the reason
    pub fn is_upstream(&self) -> bool {
        match self {
            Error::UpstreamUnavailable(_)
            | Error::UpstreamStatus { .. }
            | Error::MalformedBody { .. } => true,
            Error::ChannelFetch { source, .. } | Error::AllChannelsFailed { source, .. } => {
                source.is_upstream()
            }
            _ => false,
        }
    }

    /// `true` when the upstream did not answer in time
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::UpstreamUnavailable(e) => e.is_timeout(),
            Error::ChannelFetch { source, .. } | Error::AllChannelsFailed { source, .. } => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}
