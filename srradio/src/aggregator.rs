//! Song aggregation across all channels
//!
//! [`SongAggregator`] fetches the channel index, then the "right now" playlist
//! of every channel, and keeps one song per channel (the current one, else the
//! previous one).
//!
//! Channels are grouped in consecutive batches of `batch_size`. Playlist
//! requests go through a single rolling window of `min(batch_size,
//! concurrency)` slots, so a slow channel only holds its own slot and never
//! delays the channels queued behind it. Songs come out in completion order.

use crate::error::{Error, Result};
use crate::models::Song;
use crate::source::ProgramSource;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default number of channels per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default number of playlist requests in flight
pub const DEFAULT_CONCURRENCY: usize = 5;

/// What to do when the playlist of one channel cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelFailurePolicy {
    /// Log the failure, remember the channel and keep going
    #[default]
    Skip,
    /// Fail the whole aggregation with [`Error::ChannelFetch`]
    Abort,
}

impl fmt::Display for ChannelFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelFailurePolicy::Skip => write!(f, "skip"),
            ChannelFailurePolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for ChannelFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(ChannelFailurePolicy::Skip),
            "abort" => Ok(ChannelFailurePolicy::Abort),
            other => Err(Error::Config(anyhow::anyhow!(
                "Unknown channel failure policy '{}' (expected 'skip' or 'abort')",
                other
            ))),
        }
    }
}

/// Tuning of the fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    pub batch_size: usize,
    pub concurrency: usize,
    pub channel_failure: ChannelFailurePolicy,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            channel_failure: ChannelFailurePolicy::default(),
        }
    }
}

impl AggregatorSettings {
    /// Settings with `batch_size` and `concurrency` clamped to at least 1
    pub fn normalized(self) -> Self {
        Self {
            batch_size: self.batch_size.max(1),
            concurrency: self.concurrency.max(1),
            channel_failure: self.channel_failure,
        }
    }
}

/// Result of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongAggregate {
    /// One song per channel that had something to report, in completion order
    pub songs: Vec<Song>,
    /// Number of batches issued
    pub batches: usize,
    /// Channels whose playlist could not be fetched (skip policy only)
    pub failed_channels: Vec<i64>,
}

/// Aggregates the songs currently (or last) played on every channel
#[derive(Debug, Clone)]
pub struct SongAggregator<S> {
    source: S,
    settings: AggregatorSettings,
}

impl<S: ProgramSource> SongAggregator<S> {
    pub fn new(source: S, settings: AggregatorSettings) -> Self {
        Self {
            source,
            settings: settings.normalized(),
        }
    }

    /// Aggregator with the default settings (batches of 5, 5 in flight, skip)
    pub fn with_defaults(source: S) -> Self {
        Self::new(source, AggregatorSettings::default())
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the aggregation and return the songs only
    pub async fn aggregate_songs(&self) -> Result<Vec<Song>> {
        Ok(self.aggregate().await?.songs)
    }

    /// Run the aggregation
    ///
    /// Fails when the channel index cannot be fetched. A failing channel is
    /// either skipped or aborts the run, depending on
    /// [`AggregatorSettings::channel_failure`]. Aborting drops the requests
    /// still in flight. When every channel fails the run fails with
    /// [`Error::AllChannelsFailed`].
    pub async fn aggregate(&self) -> Result<SongAggregate> {
        let start_time = Instant::now();

        let index = self.source.channel_index().await?;
        let channels = index.channel_ids();
        info!(
            channels = channels.len(),
            batch_size = self.settings.batch_size,
            concurrency = self.settings.concurrency,
            "Aggregating songs"
        );

        let source = &self.source;
        let window = self.settings.concurrency.min(self.settings.batch_size);
        let mut aggregate = SongAggregate::default();

        for batch in channels.chunks(self.settings.batch_size) {
            aggregate.batches += 1;
            debug!(batch = aggregate.batches, channels = ?batch, "Queueing batch");
        }

        let mut playlists = stream::iter(channels.iter().copied())
            .map(|channel| async move { (channel, source.now_playing(channel).await) })
            .buffer_unordered(window);

        let mut last_error = None;
        while let Some((channel, result)) = playlists.next().await {
            match result {
                Ok(playlist) => {
                    if let Some(song) = playlist.into_available_song() {
                        aggregate.songs.push(song);
                    } else {
                        debug!(channel, "Nothing played on channel");
                    }
                }
                Err(e) => match self.settings.channel_failure {
                    ChannelFailurePolicy::Skip => {
                        warn!(channel, "Skipping channel: {}", e);
                        aggregate.failed_channels.push(channel);
                        last_error = Some(e);
                    }
                    ChannelFailurePolicy::Abort => {
                        return Err(Error::ChannelFetch {
                            channel,
                            source: Box::new(e),
                        });
                    }
                },
            }
        }

        // Nothing but failures is an upstream outage, not an empty playlist
        if let Some(e) = last_error {
            if aggregate.failed_channels.len() == channels.len() {
                return Err(Error::AllChannelsFailed {
                    channels: channels.len(),
                    source: Box::new(e),
                });
            }
        }

        info!(
            songs = aggregate.songs.len(),
            batches = aggregate.batches,
            failed = aggregate.failed_channels.len(),
            "Aggregation completed in {}ms",
            start_time.elapsed().as_millis()
        );

        Ok(aggregate)
    }
}
