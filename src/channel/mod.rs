//! Outbound notification channels
//!
//! Provides a uniform interface over the two URL-discovery APIs so the
//! orchestrator can fan out to whichever channels are configured.

mod factory;
mod google;
mod indexnow;

pub use factory::{create_channels, Channels};
pub use google::{
    BatchPublishReport, GoogleIndexingClient, NotificationMode, UrlOutcome, GOOGLE_BATCH_SIZE,
    INDEXING_ENDPOINT, INDEXING_SCOPE,
};
pub use indexnow::{
    key_location, IndexNowClient, IndexNowReport, INDEXNOW_ENDPOINT, MAX_URLS_PER_REQUEST,
};

use crate::types::{ChannelKind, ChannelResult};
use async_trait::async_trait;

/// A channel the orchestrator can notify about a URL
///
/// Implementations must never fail: transport errors, provider rejections and
/// unusable credentials are all reported as [`ChannelResult::Failure`].
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Which channel this is (decides where its outcome is stored)
    fn kind(&self) -> ChannelKind;

    /// Announce that `url` was added or updated
    async fn notify(&self, url: &str) -> ChannelResult;
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
