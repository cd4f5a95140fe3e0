//! Submission engine
//!
//! Turns CMS activity into URL submissions:
//! 1. Tracking - item change events upsert pending items
//! 2. Collecting - a site publish finds published items with no submission yet
//! 3. Submitting - each URL is deduplicated, fanned out to the channels and
//!    its per-channel outcome persisted

mod events;
mod orchestrator;
mod progress;
mod tracker;

pub use events::{
    EventHandler, EventOutcome, FieldData, ItemChanged, ItemFailure, ItemUnpublished, PublishReport,
    SitePublished,
};
pub use orchestrator::{Orchestrator, SubmissionResult};
pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use tracker::PendingTracker;

/// Absolute form of a tracked item URL
///
/// URLs with an `http://` or `https://` scheme are returned as-is; anything
/// else is a path (including slugs like `http-caching-guide`) and is placed on
/// `https://{site_name}`, with a leading `/` added when missing. Returns `None`
/// for a path when the site has no known domain.
pub fn absolute_url(site_name: Option<&str>, path: &str) -> Option<String> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }
    let site_name = site_name.filter(|name| !name.is_empty())?;
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!("https://{site_name}{separator}{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_keeps_absolute() {
        assert_eq!(
            absolute_url(Some("a.com"), "https://b.com/x").as_deref(),
            Some("https://b.com/x")
        );
        assert_eq!(
            absolute_url(None, "http://b.com/x").as_deref(),
            Some("http://b.com/x")
        );
    }

    #[test]
    fn test_absolute_url_http_prefixed_slug_is_a_path() {
        assert_eq!(
            absolute_url(Some("a.com"), "http-caching-guide").as_deref(),
            Some("https://a.com/http-caching-guide")
        );
        assert_eq!(
            absolute_url(Some("a.com"), "/https-migration").as_deref(),
            Some("https://a.com/https-migration")
        );
    }

    #[test]
    fn test_absolute_url_prefixes_domain() {
        assert_eq!(
            absolute_url(Some("a.com"), "/blog/x").as_deref(),
            Some("https://a.com/blog/x")
        );
        assert_eq!(
            absolute_url(Some("a.com"), "blog/x").as_deref(),
            Some("https://a.com/blog/x")
        );
    }

    #[test]
    fn test_absolute_url_without_domain() {
        assert_eq!(absolute_url(None, "/blog/x"), None);
        assert_eq!(absolute_url(Some(""), "/blog/x"), None);
    }
}
