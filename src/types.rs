//! Core types for indexflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A CMS site registered through the OAuth flow
///
/// Credentials are owned by the token-exchange side; the submission core only
/// reads `site_name` (to absolutize paths) and never mutates a site.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    /// CMS site identifier
    pub site_id: String,
    /// Public domain of the site (e.g. "www.example.com")
    pub site_name: Option<String>,
    /// OAuth access token
    pub access_token: String,
    /// OAuth refresh token
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub token_expires_at: Option<DateTime<Utc>>,
    /// When the site was first registered
    pub created_at: DateTime<Utc>,
    /// When the site record last changed
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("site_id", &self.site_id)
            .field("site_name", &self.site_name)
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_expires_at", &self.token_expires_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A CMS item seen through change events but not yet submitted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingItem {
    /// Row identifier
    pub id: String,
    /// CMS site identifier
    pub site_id: String,
    /// CMS collection identifier
    pub collection_id: String,
    /// CMS item identifier (unique per site)
    pub item_id: String,
    /// Item path or URL, not yet absolutized
    pub url: String,
    /// Last known publish state of the item
    pub is_draft: bool,
    /// When the item was first tracked
    pub created_at: DateTime<Utc>,
    /// When the item was last tracked
    pub updated_at: DateTime<Utc>,
}

/// Per-channel submission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// Not attempted yet (or channel not configured)
    Pending,
    /// Channel accepted the URL
    Success,
    /// Channel rejected the URL or could not be reached
    Failed,
}

impl ChannelStatus {
    /// Column value used in the store
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether the status is terminal (success or failed)
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(Error::Validation(format!("unknown channel status: {other}"))),
        }
    }
}

/// The two outbound notification channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// IndexNow multi-engine push protocol
    IndexNow,
    /// Google Indexing API
    Google,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexNow => f.write_str("IndexNow"),
            Self::Google => f.write_str("Google"),
        }
    }
}

/// Why a channel attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Channel credential absent or unusable
    NotConfigured,
    /// URL could not be parsed
    InvalidUrl,
    /// Provider answered with an error
    Rejected,
    /// Network or protocol error before a provider answer
    Transport,
}

/// Outcome of a single channel call
///
/// Channels always hand back one of these, never an error, so the stored
/// per-channel status is always terminal after an attempt. The serialized
/// form is what gets persisted as the channel's raw response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChannelResult {
    /// Provider accepted the request
    Success {
        /// HTTP status returned by the provider, when meaningful
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        /// Human-readable summary
        message: String,
        /// Provider payload
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Provider rejected the request or could not be reached
    Failure {
        /// Failure classification
        kind: FailureKind,
        /// Human-readable detail (raw response body for HTTP rejections)
        message: String,
        /// HTTP status or provider error code
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<i64>,
    },
}

impl ChannelResult {
    /// Build a success result
    pub fn success(status: Option<u16>, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self::Success {
            status,
            message: message.into(),
            data,
        }
    }

    /// Build a failure result
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
            code: None,
        }
    }

    /// Attach a status/error code to a failure (no-op on success)
    #[must_use]
    pub fn with_code(mut self, new_code: i64) -> Self {
        if let Self::Failure { code, .. } = &mut self {
            *code = Some(new_code);
        }
        self
    }

    /// Whether the provider accepted the request
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Status to persist for this outcome
    pub const fn status(&self) -> ChannelStatus {
        if self.is_success() {
            ChannelStatus::Success
        } else {
            ChannelStatus::Failed
        }
    }

    /// Summary message
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }
}

/// A URL submission record, unique per (url, site)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    /// Row identifier
    pub id: String,
    /// Absolute URL that was submitted
    pub url: String,
    /// CMS site identifier
    pub site_id: String,
    /// CMS collection, when the URL came from a CMS item
    pub collection_id: Option<String>,
    /// CMS item, when the URL came from a CMS item
    pub item_id: Option<String>,
    /// IndexNow status
    pub indexnow_status: ChannelStatus,
    /// Raw IndexNow result JSON
    pub indexnow_response: Option<String>,
    /// Google status
    pub google_status: ChannelStatus,
    /// Raw Google result JSON
    pub google_response: Option<String>,
    /// When the submission row was created
    pub created_at: DateTime<Utc>,
    /// When a channel status last changed
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Stored status for a channel
    pub const fn status(&self, channel: ChannelKind) -> ChannelStatus {
        match channel {
            ChannelKind::IndexNow => self.indexnow_status,
            ChannelKind::Google => self.google_status,
        }
    }

    /// Stored result for a channel, decoded from the raw response
    pub fn result(&self, channel: ChannelKind) -> Option<ChannelResult> {
        let raw = match channel {
            ChannelKind::IndexNow => self.indexnow_response.as_deref(),
            ChannelKind::Google => self.google_response.as_deref(),
        }?;
        serde_json::from_str(raw).ok()
    }
}

/// Aggregate submission counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    /// Number of submissions
    pub total: u64,
    /// Submissions with IndexNow status `success`
    pub indexnow_success: u64,
    /// Submissions with Google status `success`
    pub google_success: u64,
    /// IndexNow success percentage, one decimal place
    pub indexnow_rate: f64,
    /// Google success percentage, one decimal place
    pub google_rate: f64,
}

impl SubmissionStats {
    /// Build stats from raw counts
    pub fn from_counts(total: u64, indexnow_success: u64, google_success: u64) -> Self {
        Self {
            total,
            indexnow_success,
            google_success,
            indexnow_rate: success_rate(indexnow_success, total),
            google_rate: success_rate(google_success, total),
        }
    }
}

/// Percentage of `part` in `total`, rounded to one decimal; `0` when `total` is zero
#[allow(clippy::cast_precision_loss)]
pub fn success_rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}
