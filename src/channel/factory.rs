//! Channel factory
//!
//! Builds the configured subset of channels from [`Config`].

use crate::channel::{GoogleIndexingClient, IndexNowClient, NotificationChannel};
use crate::config::Config;
use std::sync::Arc;
use tracing::warn;

/// The channels a submission fans out to; `None` means skipped
#[derive(Clone, Default)]
pub struct Channels {
    /// IndexNow channel
    pub indexnow: Option<Arc<dyn NotificationChannel>>,
    /// Google Indexing channel
    pub google: Option<Arc<dyn NotificationChannel>>,
}

impl Channels {
    /// No channels at all (every submission stays `pending` on both)
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether at least one channel is configured
    pub const fn any(&self) -> bool {
        self.indexnow.is_some() || self.google.is_some()
    }
}

/// Create channels from configuration
///
/// A missing credential leaves that channel out; it is not an error.
pub fn create_channels(config: &Config) -> Channels {
    let indexnow = config.indexnow_key.as_ref().map(|key| {
        Arc::new(IndexNowClient::new(key.clone())) as Arc<dyn NotificationChannel>
    });
    if indexnow.is_none() {
        warn!("IndexNow API key not configured; IndexNow submissions will be skipped");
    }

    let google = config.indexing_credential.as_ref().map(|credential| {
        Arc::new(GoogleIndexingClient::new(credential.clone())) as Arc<dyn NotificationChannel>
    });
    if google.is_none() {
        warn!("Google service account not configured; Google submissions will be skipped");
    }

    Channels { indexnow, google }
}
