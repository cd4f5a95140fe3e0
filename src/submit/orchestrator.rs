//! Submission orchestrator
//!
//! Deduplicates a URL against the store, fans it out to the configured
//! channels and persists each channel's outcome on the submission row.

use crate::channel::{Channels, NotificationChannel};
use crate::error::{Error, Result};
use crate::store::{NewSubmission, Store};
use crate::types::{ChannelKind, ChannelResult, ChannelStatus, Submission, SubmissionStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a submit call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    /// Submission row id
    pub submission_id: String,
    /// URL as submitted
    pub url: String,
    /// At least one channel accepted the URL (or it was already submitted)
    pub success: bool,
    /// The URL had been submitted before; nothing was sent
    pub existing: bool,
    /// Stored IndexNow status
    pub indexnow_status: ChannelStatus,
    /// Stored Google status
    pub google_status: ChannelStatus,
    /// IndexNow outcome of this call (or the stored one, for existing rows)
    pub indexnow: Option<ChannelResult>,
    /// Google outcome of this call (or the stored one, for existing rows)
    pub google: Option<ChannelResult>,
    /// Note for the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the result was produced
    pub timestamp: DateTime<Utc>,
}

impl SubmissionResult {
    fn existing(submission: &Submission) -> Self {
        Self {
            submission_id: submission.id.clone(),
            url: submission.url.clone(),
            success: true,
            existing: true,
            indexnow_status: submission.indexnow_status,
            google_status: submission.google_status,
            indexnow: submission.result(ChannelKind::IndexNow),
            google: submission.result(ChannelKind::Google),
            message: Some("URL already submitted".to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Drives submissions against a store and a set of channels
#[derive(Clone)]
pub struct Orchestrator {
    store: Store,
    channels: Channels,
}

impl Orchestrator {
    /// Create an orchestrator
    pub const fn new(store: Store, channels: Channels) -> Self {
        Self { store, channels }
    }

    /// The underlying store
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The channels submissions fan out to
    pub const fn channels(&self) -> &Channels {
        &self.channels
    }

    /// Submit a URL for a site
    ///
    /// A (url, site) pair is only ever submitted once: if a row exists the
    /// stored outcome is returned with `existing = true` and no channel is
    /// called. Otherwise a `pending` row is written first, then both channels
    /// are notified concurrently and each outcome is stored. Unconfigured
    /// channels are skipped and keep their `pending` status.
    ///
    /// If storing an outcome fails, both statuses are forced to `failed` and
    /// the error is returned.
    pub async fn submit(&self, request: NewSubmission<'_>) -> Result<SubmissionResult> {
        validate(&request)?;

        if let Some(existing) = self.store.find_submission(request.url, request.site_id)? {
            debug!("{} already submitted for {}", request.url, request.site_id);
            return Ok(SubmissionResult::existing(&existing));
        }

        let submission = match self.claim(request)? {
            Claim::Created(submission) => submission,
            Claim::Existing(existing) => return Ok(SubmissionResult::existing(&existing)),
        };

        match self.dispatch(&submission).await {
            Ok(result) => {
                info!(
                    "Submitted {} (IndexNow: {}, Google: {})",
                    result.url, result.indexnow_status, result.google_status
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Submission {} failed: {e}", submission.id);
                if let Err(mark_err) = self.store.mark_submission_failed(&submission.id) {
                    warn!("Could not mark submission {} failed: {mark_err}", submission.id);
                }
                Err(e)
            }
        }
    }

    /// Delete a submission and submit its URL again
    pub async fn resubmit(&self, submission_id: &str) -> Result<SubmissionResult> {
        let previous = self.get_submission(submission_id)?;
        self.store.delete_submission(&previous.id)?;
        info!("Resubmitting {} (was {})", previous.url, previous.id);

        self.submit(NewSubmission {
            url: &previous.url,
            site_id: &previous.site_id,
            collection_id: previous.collection_id.as_deref(),
            item_id: previous.item_id.as_deref(),
        })
        .await
    }

    /// Look up a submission by id
    pub fn get_submission(&self, submission_id: &str) -> Result<Submission> {
        self.store
            .get_submission(submission_id)?
            .ok_or_else(|| Error::NotFound(format!("submission {submission_id}")))
    }

    /// Submissions newest first, optionally for one site
    pub fn list_submissions(
        &self,
        site_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Submission>> {
        self.store.list_submissions(site_id, limit, offset)
    }

    /// Submission counts and per-channel success rates
    pub fn stats(&self, site_id: Option<&str>) -> Result<SubmissionStats> {
        self.store.submission_stats(site_id)
    }

    /// Insert the `pending` row, or resolve a lost insert race to the winner's row
    fn claim(&self, request: NewSubmission<'_>) -> Result<Claim> {
        match self.store.insert_submission(request) {
            Ok(submission) => Ok(Claim::Created(submission)),
            Err(Error::Conflict { url, site_id }) => {
                debug!("concurrent submission of {url} for {site_id}");
                let existing = self
                    .store
                    .find_submission(&url, &site_id)?
                    .ok_or(Error::Conflict { url, site_id })?;
                Ok(Claim::Existing(existing))
            }
            Err(e) => Err(e),
        }
    }

    async fn dispatch(&self, submission: &Submission) -> Result<SubmissionResult> {
        let (indexnow, google) = tokio::join!(
            notify(self.channels.indexnow.as_ref(), ChannelKind::IndexNow, &submission.url),
            notify(self.channels.google.as_ref(), ChannelKind::Google, &submission.url),
        );

        for (kind, result) in [(ChannelKind::IndexNow, &indexnow), (ChannelKind::Google, &google)] {
            if let Some(result) = result {
                self.store.record_channel_result(&submission.id, kind, result)?;
            }
        }

        let status = |result: &Option<ChannelResult>| {
            result.as_ref().map_or(ChannelStatus::Pending, ChannelResult::status)
        };
        let success = [&indexnow, &google]
            .into_iter()
            .flatten()
            .any(ChannelResult::is_success);
        Ok(SubmissionResult {
            submission_id: submission.id.clone(),
            url: submission.url.clone(),
            success,
            existing: false,
            indexnow_status: status(&indexnow),
            google_status: status(&google),
            indexnow,
            google,
            message: None,
            timestamp: Utc::now(),
        })
    }
}

enum Claim {
    Created(Submission),
    Existing(Submission),
}

async fn notify(
    channel: Option<&Arc<dyn NotificationChannel>>,
    kind: ChannelKind,
    url: &str,
) -> Option<ChannelResult> {
    let Some(channel) = channel else {
        debug!("{kind} not configured, skipping {url}");
        return None;
    };
    let result = channel.notify(url).await;
    if !result.is_success() {
        warn!("{} did not accept {url}: {}", channel.kind(), result.message());
    }
    Some(result)
}

fn validate(request: &NewSubmission<'_>) -> Result<()> {
    if request.url.trim().is_empty() {
        return Err(Error::Validation("url is required".to_string()));
    }
    if request.site_id.trim().is_empty() {
        return Err(Error::Validation("siteId is required".to_string()));
    }
    let parsed = url::Url::parse(request.url)
        .map_err(|e| Error::Validation(format!("invalid URL '{}': {e}", request.url)))?;
    if parsed.host_str().is_none() {
        return Err(Error::Validation(format!("URL '{}' has no host", request.url)));
    }
    Ok(())
}
