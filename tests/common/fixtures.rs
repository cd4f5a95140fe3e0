//! Test data factories for indexflow types
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use super::MockChannel;
use chrono::Utc;
use indexflow::channel::{Channels, NotificationChannel};
use indexflow::store::{NewSubmission, Store};
use indexflow::types::Site;
use std::sync::Arc;

/// Create a site with default values
pub fn make_site(site_id: &str, site_name: &str) -> Site {
    let now = Utc::now();
    Site {
        site_id: site_id.to_string(),
        site_name: Some(site_name.to_string()),
        access_token: format!("{site_id}_access_token"),
        refresh_token: None,
        token_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Open an in-memory store with one registered site
pub fn store_with_site(site_id: &str, site_name: &str) -> Store {
    let store = Store::open_in_memory().unwrap();
    store.save_site(&make_site(site_id, site_name)).unwrap();
    store
}

/// Submission request without CMS item details
pub fn make_request<'a>(url: &'a str, site_id: &'a str) -> NewSubmission<'a> {
    NewSubmission {
        url,
        site_id,
        collection_id: None,
        item_id: None,
    }
}

/// Wire mock channels into the orchestrator's channel set
pub fn make_channels(indexnow: Option<&Arc<MockChannel>>, google: Option<&Arc<MockChannel>>) -> Channels {
    Channels {
        indexnow: indexnow.map(|c| Arc::clone(c) as Arc<dyn NotificationChannel>),
        google: google.map(|c| Arc::clone(c) as Arc<dyn NotificationChannel>),
    }
}

/// Both mock channels, accepting everything
pub fn accepting_channels() -> (Arc<MockChannel>, Arc<MockChannel>, Channels) {
    let indexnow = Arc::new(MockChannel::indexnow());
    let google = Arc::new(MockChannel::google());
    let channels = make_channels(Some(&indexnow), Some(&google));
    (indexnow, google, channels)
}
