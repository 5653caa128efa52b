//! Extension to read the Sveriges Radio settings from srconfig
//!
//! This module provides the `SverigesRadioConfigExt` trait which adds the
//! `upstream.*` getters to `srconfig::Config`.
//!
//! # Example
//!
//! ```no_run
//! use srconfig::Config;
//! use srradio::SverigesRadioConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load_config("")?;
//! let client = config.sverigesradio_client_builder()?.build()?;
//! let settings = config.get_aggregator_settings()?;
//! println!("{} channels per batch against {}", settings.batch_size, client.base_url());
//! # Ok(())
//! # }
//! ```

use crate::aggregator::{AggregatorSettings, ChannelFailurePolicy, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use crate::client::{ClientBuilder, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use anyhow::{anyhow, Result};
use srconfig::Config;
use std::time::Duration;

/// Extension trait reading the upstream settings from `srconfig::Config`
///
/// Missing keys fall back to the crate defaults. Values of the wrong type are
/// reported as errors.
pub trait SverigesRadioConfigExt {
    /// `upstream.base_url`
    fn get_upstream_base_url(&self) -> Result<String>;

    /// `upstream.timeout_secs`
    fn get_upstream_timeout_secs(&self) -> Result<u64>;

    /// `upstream.user_agent`
    fn get_upstream_user_agent(&self) -> Result<String>;

    /// `upstream.programs.batch_size`
    fn get_programs_batch_size(&self) -> Result<usize>;

    /// `upstream.programs.concurrency`
    fn get_programs_concurrency(&self) -> Result<usize>;

    /// `upstream.programs.channel_failure` (`skip` or `abort`)
    fn get_programs_channel_failure(&self) -> Result<ChannelFailurePolicy>;

    /// `upstream.programs.follow_pagination`
    fn get_programs_follow_pagination(&self) -> Result<bool>;

    /// `upstream.programs.page_size`, unset by default
    fn get_programs_page_size(&self) -> Result<Option<u32>>;

    /// Aggregator settings assembled from the `upstream.programs` section
    fn get_aggregator_settings(&self) -> Result<AggregatorSettings>;

    /// Client builder preconfigured from the `upstream` section
    fn sverigesradio_client_builder(&self) -> Result<ClientBuilder>;
}

impl SverigesRadioConfigExt for Config {
    fn get_upstream_base_url(&self) -> Result<String> {
        self.get_string_or(&["upstream", "base_url"], DEFAULT_BASE_URL)
    }

    fn get_upstream_timeout_secs(&self) -> Result<u64> {
        self.get_u64_or(&["upstream", "timeout_secs"], DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    fn get_upstream_user_agent(&self) -> Result<String> {
        self.get_string_or(&["upstream", "user_agent"], DEFAULT_USER_AGENT)
    }

    fn get_programs_batch_size(&self) -> Result<usize> {
        let size = self.get_u64_or(
            &["upstream", "programs", "batch_size"],
            DEFAULT_BATCH_SIZE as u64,
        )?;
        Ok(usize::try_from(size)?)
    }

    fn get_programs_concurrency(&self) -> Result<usize> {
        let concurrency = self.get_u64_or(
            &["upstream", "programs", "concurrency"],
            DEFAULT_CONCURRENCY as u64,
        )?;
        Ok(usize::try_from(concurrency)?)
    }

    fn get_programs_channel_failure(&self) -> Result<ChannelFailurePolicy> {
        let policy = self.get_string_or(
            &["upstream", "programs", "channel_failure"],
            &ChannelFailurePolicy::default().to_string(),
        )?;
        Ok(policy.parse::<ChannelFailurePolicy>()?)
    }

    fn get_programs_follow_pagination(&self) -> Result<bool> {
        self.get_bool_or(&["upstream", "programs", "follow_pagination"], false)
    }

    fn get_programs_page_size(&self) -> Result<Option<u32>> {
        match self.get_typed::<Option<u32>>(&["upstream", "programs", "page_size"]) {
            Ok(Some(0)) => Err(anyhow!("upstream.programs.page_size must be positive")),
            Ok(size) => Ok(size),
            Err(_) if self.get_value(&["upstream", "programs", "page_size"]).is_err() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn get_aggregator_settings(&self) -> Result<AggregatorSettings> {
        Ok(AggregatorSettings {
            batch_size: self.get_programs_batch_size()?,
            concurrency: self.get_programs_concurrency()?,
            channel_failure: self.get_programs_channel_failure()?,
        }
        .normalized())
    }

    fn sverigesradio_client_builder(&self) -> Result<ClientBuilder> {
        Ok(ClientBuilder::new()
            .base_url(self.get_upstream_base_url()?)
            .timeout(Duration::from_secs(self.get_upstream_timeout_secs()?))
            .user_agent(self.get_upstream_user_agent()?)
            .follow_pagination(self.get_programs_follow_pagination()?)
            .index_page_size(self.get_programs_page_size()?))
    }
}
