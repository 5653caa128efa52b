//! HTTP client for the Sveriges Radio API
//!
//! This module provides a client for the public Sveriges Radio open API
//! (`https://api.sr.se/api/v2`): program index, "right now" playlists and
//! traffic messages.
//!
//! # Example
//!
//! ```no_run
//! use srradio::SverigesRadioClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SverigesRadioClient::new()?;
//!
//!     let playlist = client.now_playing(164).await?;
//!     if let Some(song) = playlist.available_song() {
//!         println!("P3: {:?} - {:?}", song.artist, song.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{ChannelIndex, Playlist, RightNow, TrafficBundle};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default Sveriges Radio API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.sr.se/api/v2";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("SRAggregator/", env!("CARGO_PKG_VERSION"), " (srradio)");

/// Upper bound on the number of index pages fetched when following pagination
pub const MAX_INDEX_PAGES: u32 = 100;

/// Sveriges Radio HTTP client
///
/// The client is stateless and immutable once built: no caching, no retries.
/// Cloning it is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SverigesRadioClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    follow_pagination: bool,
    index_page_size: Option<u32>,
}

impl SverigesRadioClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Build the absolute URL of `path` below the base URL
    ///
    /// `path` must start with `/` and must carry neither a scheme, a query nor
    /// a fragment. The base URL's own path (e.g. `/api/v2`) is kept.
    pub fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        if !path.starts_with('/')
            || path.starts_with("//")
            || path.contains("://")
            || path.contains('?')
            || path.contains('#')
        {
            return Err(Error::invalid_path(path));
        }

        let mut url = self.base_url.clone();
        let full_path = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&full_path);
        url.set_query(None);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        Ok(url)
    }

    /// Perform one GET and deserialize the JSON body into `T`
    ///
    /// Transport failures map to [`Error::UpstreamUnavailable`], non-2xx
    /// statuses to [`Error::UpstreamStatus`] and unparseable bodies to
    /// [`Error::MalformedBody`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.endpoint_url(path, query)?;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Error::UpstreamUnavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(Error::UpstreamUnavailable)?;

        serde_json::from_slice(&body).map_err(|source| Error::MalformedBody {
            url: url.to_string(),
            source,
        })
    }

    // ========================================================================
    // Programs
    // ========================================================================

    /// Fetch the program index (`GET /programs/index?format=json`)
    ///
    /// With pagination following enabled, pages 2 to `totalpages` (at most
    /// [`MAX_INDEX_PAGES`]) are fetched one after another and their programs
    /// appended in order.
    pub async fn channel_index(&self) -> Result<ChannelIndex> {
        let mut index = self.channel_index_page(None).await?;

        if self.follow_pagination {
            let last_page = index.total_pages().min(MAX_INDEX_PAGES);
            for page in 2..=last_page {
                let next = self.channel_index_page(Some(page)).await?;
                index.programs.extend(next.programs);
                index.pagination = next.pagination;
            }
        }

        debug!("Program index holds {} programs", index.programs.len());
        Ok(index)
    }

    async fn channel_index_page(&self, page: Option<u32>) -> Result<ChannelIndex> {
        let size = self.index_page_size.map(|s| s.to_string());
        let page = page.map(|p| p.to_string());

        let mut query = vec![("format", "json")];
        if let Some(size) = size.as_deref() {
            query.push(("size", size));
        }
        if let Some(page) = page.as_deref() {
            query.push(("page", page));
        }

        self.get_json("/programs/index", &query).await
    }

    /// Fetch the current playlist of a channel
    /// (`GET /playlists/rightnow?channelid=<id>&format=json`)
    pub async fn now_playing(&self, channel_id: i64) -> Result<Playlist> {
        let channel = channel_id.to_string();
        let right_now: RightNow = self
            .get_json(
                "/playlists/rightnow",
                &[("channelid", channel.as_str()), ("format", "json")],
            )
            .await?;
        Ok(right_now.playlist)
    }

    // ========================================================================
    // Traffic
    // ========================================================================

    /// Fetch the traffic messages (`GET /traffic/messages?format=json`)
    pub async fn traffic_messages(&self) -> Result<TrafficBundle> {
        self.get_json("/traffic/messages", &[("format", "json")])
            .await
    }
}

/// Builder for [`SverigesRadioClient`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    follow_pagination: bool,
    index_page_size: Option<u32>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            follow_pagination: false,
            index_page_size: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    ///
    /// The user agent configured on the builder is not applied to it.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch every page of the program index instead of only the first one
    pub fn follow_pagination(mut self, follow: bool) -> Self {
        self.follow_pagination = follow;
        self
    }

    /// Ask the program index for pages of `size` entries
    pub fn index_page_size(mut self, size: Option<u32>) -> Self {
        self.index_page_size = size;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SverigesRadioClient> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()
                .map_err(Error::Http)?,
        };

        Ok(SverigesRadioClient {
            client,
            base_url,
            timeout: self.timeout,
            follow_pagination: self.follow_pagination,
            index_page_size: self.index_page_size,
        })
    }
}
