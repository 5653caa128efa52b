//! srserver extension for Sveriges Radio
//!
//! This module provides an extension trait adding the aggregated songs and
//! traffic messages API to an `srserver::Server`.

use crate::aggregator::{AggregatorSettings, SongAggregator};
use crate::client::SverigesRadioClient;
use crate::config_ext::SverigesRadioConfigExt;
use crate::traffic::TrafficFetcher;
use anyhow::Result;
use srconfig::Config;
use std::sync::Arc;

/// Shared state of the Sveriges Radio handlers
///
/// Holds immutable values only: every request reads it, none writes it.
#[derive(Clone)]
pub struct SverigesRadioState {
    pub aggregator: Arc<SongAggregator<SverigesRadioClient>>,
    pub traffic: Arc<TrafficFetcher<SverigesRadioClient>>,
}

impl SverigesRadioState {
    /// State sharing one client between the aggregator and the traffic fetcher
    pub fn new(client: SverigesRadioClient, settings: AggregatorSettings) -> Self {
        Self {
            aggregator: Arc::new(SongAggregator::new(client.clone(), settings)),
            traffic: Arc::new(TrafficFetcher::new(client)),
        }
    }

    /// State built from the `upstream` section of the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = config.sverigesradio_client_builder()?.build()?;
        let settings = config.get_aggregator_settings()?;
        Ok(Self::new(client, settings))
    }
}

/// Trait extending `srserver::Server` with the Sveriges Radio API
///
/// `srserver` does not depend on `srradio`: the routes are added from here.
///
/// # Example
///
/// ```rust,no_run
/// use srradio::SverigesRadioExt;
/// use srserver::ServerBuilder;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = srconfig::Config::load_config("")?;
///     let mut server = ServerBuilder::new_configured(&config).build();
///
///     server.init_sverigesradio(&config).await?;
///
///     server.start().await?;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait SverigesRadioExt {
    /// Builds the client from the configuration and registers the HTTP routes
    ///
    /// # Registered routes
    ///
    /// - `GET /api/v1/programs/aggregated-songs` - now playing song of every channel
    /// - `GET /api/v1/traffic/messages` - latest traffic messages
    /// - `GET /api-docs/v1.json` and `/swagger-ui/v1` - API documentation
    async fn init_sverigesradio(&mut self, config: &Config) -> Result<Arc<SverigesRadioState>>;

    /// Same as `init_sverigesradio()` with an already built state
    async fn init_sverigesradio_with_state(
        &mut self,
        state: SverigesRadioState,
    ) -> Result<Arc<SverigesRadioState>>;
}

// Implemented in server_impl.rs
