//! CMS webhook event handling
//!
//! Three events drive the engine:
//! - item changed: track the item's URL and draft state
//! - site published: submit every published item that has no submission yet
//! - item unpublished: flip the item back to draft

use crate::channel::Channels;
use crate::error::{Error, Result};
use crate::store::{NewSubmission, Store};
use crate::submit::{
    absolute_url, Orchestrator, PendingTracker, Phase, ProgressCallback, SubmissionResult,
};
use crate::types::{PendingItem, Site};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Item created or updated in a CMS collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChanged {
    /// Site identifier
    #[serde(default)]
    pub site: String,
    /// Item identifier
    #[serde(rename = "_id", default)]
    pub item_id: String,
    /// Collection identifier
    #[serde(default)]
    pub collection_id: Option<String>,
    /// Item path or URL
    #[serde(default, alias = "slug")]
    pub url: Option<String>,
    /// Item fields, consulted for the slug when `url` is absent
    #[serde(default)]
    pub field_data: Option<FieldData>,
    /// Publish state; treated as draft when absent
    #[serde(default)]
    pub is_draft: Option<bool>,
}

/// Item fields carried by a change event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldData {
    /// Item slug
    #[serde(default)]
    pub slug: Option<String>,
}

impl ItemChanged {
    fn effective_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or_else(|| self.field_data.as_ref()?.slug.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    fn is_draft(&self) -> bool {
        self.is_draft != Some(false)
    }
}

/// Site published
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePublished {
    /// Site identifier
    #[serde(default)]
    pub site: String,
}

/// Item unpublished from a CMS collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUnpublished {
    /// Site identifier
    #[serde(default)]
    pub site: String,
    /// Item identifier
    #[serde(rename = "_id", default)]
    pub item_id: String,
}

/// An item a site publish could not submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    /// Item identifier
    pub item_id: String,
    /// Tracked URL of the item
    pub url: String,
    /// What went wrong
    pub error: String,
}

/// What a site publish did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    /// Site identifier
    pub site_id: String,
    /// One result per item submitted
    pub submissions: Vec<SubmissionResult>,
    /// Items that could not be submitted; they stay tracked
    pub failures: Vec<ItemFailure>,
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Nothing to do
    Ignored {
        /// Why the event was ignored
        reason: String,
    },
    /// Item state recorded
    Tracked {
        /// The tracked row
        item: PendingItem,
    },
    /// Site publish processed
    Published(PublishReport),
    /// Item flipped back to draft
    Unpublished {
        /// Site identifier
        site_id: String,
        /// Item identifier
        item_id: String,
        /// Whether the item was being tracked
        tracked: bool,
    },
}

impl EventOutcome {
    fn ignored(reason: impl Into<String>) -> Self {
        Self::Ignored {
            reason: reason.into(),
        }
    }
}

/// Applies CMS events to the tracker and the orchestrator
#[derive(Clone)]
pub struct EventHandler {
    orchestrator: Orchestrator,
    tracker: PendingTracker,
}

impl EventHandler {
    /// Create a handler over `store`, submitting through `channels`
    pub fn new(store: Store, channels: Channels) -> Self {
        Self {
            tracker: PendingTracker::new(store.clone()),
            orchestrator: Orchestrator::new(store, channels),
        }
    }

    /// The orchestrator publish events submit through
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The tracker change events write to
    pub const fn tracker(&self) -> &PendingTracker {
        &self.tracker
    }

    /// Track an item's latest URL and draft state
    pub fn handle_item_changed(&self, event: &ItemChanged) -> Result<EventOutcome> {
        require("site", &event.site)?;
        require("_id", &event.item_id)?;

        if self.registered_site(&event.site)?.is_none() {
            return Ok(EventOutcome::ignored("Site not registered, ignoring event"));
        }
        let Some(collection_id) = event.collection_id.as_deref().filter(|c| !c.is_empty()) else {
            warn!("Item {} changed without a collection id", event.item_id);
            return Ok(EventOutcome::ignored("No collection ID"));
        };
        let Some(url) = event.effective_url() else {
            warn!("Item {} changed without a URL", event.item_id);
            return Ok(EventOutcome::ignored("No item URL"));
        };

        let item = self.tracker.track_item(
            &event.site,
            collection_id,
            &event.item_id,
            url,
            event.is_draft(),
        )?;
        Ok(EventOutcome::Tracked { item })
    }

    /// Submit every published, not yet submitted item of the site
    ///
    /// Items are submitted one after another. A failing item is reported and
    /// stays tracked; the rest still go out. An item is cleared only once its
    /// submission call returned.
    pub async fn handle_site_published(
        &self,
        event: &SitePublished,
        progress: &dyn ProgressCallback,
    ) -> Result<EventOutcome> {
        require("site", &event.site)?;

        let Some(site) = self.registered_site(&event.site)? else {
            return Ok(EventOutcome::ignored("Site not registered, ignoring event"));
        };

        progress.on_phase(Phase::Collecting).await;
        let items = self.tracker.list_published_unsubmitted(&site.site_id)?;
        info!("Site {} published with {} item(s) to submit", site.site_id, items.len());
        progress
            .on_message(&format!("Found {} published item(s) to submit", items.len()))
            .await;

        progress.on_phase(Phase::Submitting).await;
        let mut report = PublishReport {
            site_id: site.site_id.clone(),
            submissions: Vec::with_capacity(items.len()),
            failures: Vec::new(),
        };

        for item in &items {
            match self.submit_item(&site, item).await {
                Ok(result) => {
                    if let Err(e) = self.tracker.clear_by_id(&item.id) {
                        warn!("Submitted item {} but could not clear it: {e}", item.item_id);
                    }
                    progress.on_item_submitted(item, &result).await;
                    report.submissions.push(result);
                }
                Err(e) => {
                    warn!("Error submitting item {}: {e}", item.item_id);
                    progress.on_error(&e).await;
                    report.failures.push(ItemFailure {
                        item_id: item.item_id.clone(),
                        url: item.url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        progress.on_phase(Phase::Complete).await;
        Ok(EventOutcome::Published(report))
    }

    /// Flip an item back to draft
    ///
    /// Submissions already recorded for the item are left as they are.
    pub fn handle_item_unpublished(&self, event: &ItemUnpublished) -> Result<EventOutcome> {
        require("site", &event.site)?;
        require("_id", &event.item_id)?;

        let tracked = self.tracker.mark_draft(&event.site, &event.item_id)?;
        Ok(EventOutcome::Unpublished {
            site_id: event.site.clone(),
            item_id: event.item_id.clone(),
            tracked,
        })
    }

    async fn submit_item(&self, site: &Site, item: &PendingItem) -> Result<SubmissionResult> {
        let url = absolute_url(site.site_name.as_deref(), &item.url).ok_or_else(|| {
            Error::Validation(format!(
                "site {} has no domain to resolve {}",
                site.site_id, item.url
            ))
        })?;

        self.orchestrator
            .submit(NewSubmission {
                url: &url,
                site_id: &item.site_id,
                collection_id: Some(&item.collection_id),
                item_id: Some(&item.item_id),
            })
            .await
    }

    fn registered_site(&self, site_id: &str) -> Result<Option<Site>> {
        let site = self.orchestrator.store().get_site(site_id)?;
        if site.is_none() {
            warn!("Site not registered: {site_id}");
        }
        Ok(site)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("missing {field}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_changed_from_webhook_json() {
        let event: ItemChanged = serde_json::from_str(
            r#"{"site": "S1", "_id": "I1", "collectionId": "C1", "slug": "/blog/x", "isDraft": false}"#,
        )
        .unwrap();

        assert_eq!(event.item_id, "I1");
        assert_eq!(event.collection_id.as_deref(), Some("C1"));
        assert_eq!(event.effective_url(), Some("/blog/x"));
        assert!(!event.is_draft());
    }

    #[test]
    fn test_item_changed_defaults_to_draft() {
        let event: ItemChanged = serde_json::from_str(
            r#"{"site": "S1", "_id": "I1", "fieldData": {"slug": "blog/y"}}"#,
        )
        .unwrap();

        assert!(event.is_draft());
        assert_eq!(event.effective_url(), Some("blog/y"));
    }

    #[test]
    fn test_missing_item_id_is_validation_error() {
        let handler = EventHandler::new(Store::open_in_memory().unwrap(), Channels::none());
        let err = handler
            .handle_item_changed(&ItemChanged {
                site: "S1".into(),
                ..ItemChanged::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_unregistered_site_is_ignored() {
        let handler = EventHandler::new(Store::open_in_memory().unwrap(), Channels::none());
        let outcome = handler
            .handle_item_changed(&ItemChanged {
                site: "S1".into(),
                item_id: "I1".into(),
                collection_id: Some("C1".into()),
                url: Some("/x".into()),
                ..ItemChanged::default()
            })
            .unwrap();
        assert_eq!(
            outcome,
            EventOutcome::ignored("Site not registered, ignoring event")
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = EventOutcome::Unpublished {
            site_id: "S1".into(),
            item_id: "I1".into(),
            tracked: false,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({
                "outcome": "unpublished",
                "site_id": "S1",
                "item_id": "I1",
                "tracked": false
            })
        );
    }
}
