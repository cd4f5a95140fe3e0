//! Pending-item tracker
//!
//! Per CMS item: `tracked(draft) <-> tracked(published) -> submitted (row cleared)`.
//! Unpublishing forces the draft state back; it never retracts a submission.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::PendingItem;
use tracing::debug;

/// Records CMS items seen through change events
#[derive(Clone)]
pub struct PendingTracker {
    store: Store,
}

impl PendingTracker {
    /// Create a tracker over `store`
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record the latest known state of an item
    ///
    /// Last write wins: a later change event for the same (site, item)
    /// replaces the URL and draft flag of the earlier one.
    pub fn track_item(
        &self,
        site_id: &str,
        collection_id: &str,
        item_id: &str,
        url: &str,
        is_draft: bool,
    ) -> Result<PendingItem> {
        for (field, value) in [
            ("siteId", site_id),
            ("collectionId", collection_id),
            ("itemId", item_id),
            ("url", url),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("{field} is required")));
            }
        }

        let item = self
            .store
            .upsert_pending_item(site_id, collection_id, item_id, url, is_draft)?;
        debug!("Tracked {site_id}/{item_id} at {url} (draft: {is_draft})");
        Ok(item)
    }

    /// Published items of a site that have no submission yet
    pub fn list_published_unsubmitted(&self, site_id: &str) -> Result<Vec<PendingItem>> {
        self.store.list_published_unsubmitted(site_id)
    }

    /// Force an item back to draft; returns whether the item was tracked
    pub fn mark_draft(&self, site_id: &str, item_id: &str) -> Result<bool> {
        self.store.mark_pending_draft(site_id, item_id)
    }

    /// Stop tracking an item; returns whether it was tracked
    pub fn clear(&self, site_id: &str, item_id: &str) -> Result<bool> {
        self.store.delete_pending_item(site_id, item_id)
    }

    /// Stop tracking a pending row by id
    pub fn clear_by_id(&self, id: &str) -> Result<()> {
        self.store.delete_pending_item_by_id(id)
    }
}
