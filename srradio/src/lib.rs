//! Sveriges Radio client library for SRAggregator
//!
//! This crate wraps two parts of the Sveriges Radio open API and republishes
//! them in a simplified, stable shape.
//!
//! # Features
//!
//! - **Upstream client**: typed GET requests against a configurable base URL
//! - **Song aggregation**: the song on air (or the previous one) on every
//!   channel, fetched in batches with bounded concurrency
//! - **Traffic messages**: the latest messages in upstream order
//! - **DTOs**: public response shapes independent of the upstream schema
//! - **Configuration extension**: `upstream.*` getters on `srconfig::Config`
//! - **Server extension**: mounts `/api/v1/...` on an `srserver::Server`
//!
//! # Example
//!
//! ```no_run
//! use srradio::{SongAggregator, SverigesRadioClient, TrafficFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SverigesRadioClient::new()?;
//!
//!     let aggregator = SongAggregator::with_defaults(client.clone());
//!     for song in aggregator.aggregate_songs().await? {
//!         println!("{:?} - {:?}", song.artist, song.title);
//!     }
//!
//!     let traffic = TrafficFetcher::new(client);
//!     println!("{} traffic messages", traffic.latest_messages().await?.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Failure policy
//!
//! When the playlist of one channel cannot be fetched, the aggregator skips it
//! by default and reports it in [`SongAggregate::failed_channels`]. With
//! [`ChannelFailurePolicy::Abort`] the whole aggregation fails instead.

pub mod aggregator;
pub mod client;
pub mod dto;
pub mod error;
pub mod models;
pub mod source;
pub mod traffic;

#[cfg(feature = "srconfig")]
pub mod config_ext;

#[cfg(feature = "server")]
pub mod api_rest;

#[cfg(feature = "server")]
pub mod server_ext;

#[cfg(feature = "server")]
mod server_impl;

// Re-exports
pub use aggregator::{AggregatorSettings, ChannelFailurePolicy, SongAggregate, SongAggregator};
pub use client::{ClientBuilder, SverigesRadioClient};
pub use dto::{SongDto, TrafficMessageDto};
pub use error::{Error, Result};
pub use models::{
    Channel, ChannelIndex, Pagination, Playlist, Program, RightNow, Song, TrafficBundle,
    TrafficMessage,
};
pub use source::{ProgramSource, TrafficSource};
pub use traffic::TrafficFetcher;

#[cfg(feature = "srconfig")]
pub use config_ext::SverigesRadioConfigExt;

#[cfg(feature = "server")]
pub use server_ext::{SverigesRadioExt, SverigesRadioState};

#[cfg(feature = "server")]
pub use server_impl::API_NAME;
