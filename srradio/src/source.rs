//! Upstream sources consumed by the aggregator and the traffic fetcher
//!
//! [`SverigesRadioClient`] implements both traits. Other implementations
//! (in-memory fixtures, recording proxies) can be plugged into
//! [`SongAggregator`](crate::SongAggregator) and
//! [`TrafficFetcher`](crate::TrafficFetcher) without touching them.

use crate::client::SverigesRadioClient;
use crate::error::Result;
use crate::models::{ChannelIndex, Playlist, TrafficBundle};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the program index and of the per-channel playlists
#[async_trait]
pub trait ProgramSource: Send + Sync {
    /// Fetch the channel index
    async fn channel_index(&self) -> Result<ChannelIndex>;

    /// Fetch what a channel is playing right now
    async fn now_playing(&self, channel_id: i64) -> Result<Playlist>;
}

/// Source of traffic messages
#[async_trait]
pub trait TrafficSource: Send + Sync {
    async fn traffic_messages(&self) -> Result<TrafficBundle>;
}

#[async_trait]
impl ProgramSource for SverigesRadioClient {
    async fn channel_index(&self) -> Result<ChannelIndex> {
        SverigesRadioClient::channel_index(self).await
    }

    async fn now_playing(&self, channel_id: i64) -> Result<Playlist> {
        SverigesRadioClient::now_playing(self, channel_id).await
    }
}

#[async_trait]
impl TrafficSource for SverigesRadioClient {
    async fn traffic_messages(&self) -> Result<TrafficBundle> {
        SverigesRadioClient::traffic_messages(self).await
    }
}

#[async_trait]
impl<S: ProgramSource + ?Sized> ProgramSource for Arc<S> {
    async fn channel_index(&self) -> Result<ChannelIndex> {
        (**self).channel_index().await
    }

    async fn now_playing(&self, channel_id: i64) -> Result<Playlist> {
        (**self).now_playing(channel_id).await
    }
}

#[async_trait]
impl<S: TrafficSource + ?Sized> TrafficSource for Arc<S> {
    async fn traffic_messages(&self) -> Result<TrafficBundle> {
        (**self).traffic_messages().await
    }
}
