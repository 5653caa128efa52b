//! Traffic message fetching

use crate::error::Result;
use crate::models::TrafficMessage;
use crate::source::TrafficSource;
use tracing::debug;

/// Fetches the latest traffic messages in one upstream call
#[derive(Debug, Clone)]
pub struct TrafficFetcher<S> {
    source: S,
}

impl<S: TrafficSource> TrafficFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Messages in upstream order
    ///
    /// A null or missing message list yields an empty vector.
    pub async fn latest_messages(&self) -> Result<Vec<TrafficMessage>> {
        let bundle = self.source.traffic_messages().await?;
        debug!("Received {} traffic messages", bundle.messages.len());
        Ok(bundle.messages)
    }
}
