//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different interfaces (CLI, webhook server, etc.) to
//! receive progress updates while a site publish is being processed.

use crate::error::Error;
use crate::submit::SubmissionResult;
use crate::types::PendingItem;
use async_trait::async_trait;

/// Publish processing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Finding published items that still need submitting
    Collecting,
    /// Submitting item URLs to the channels
    Submitting,
    /// Publish processing complete
    Complete,
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during a site publish.
/// - CLI implementations can print to terminal
/// - Webhook servers can log or stream them
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called after an item's URL was submitted (or found already submitted)
    async fn on_item_submitted(&self, item: &PendingItem, result: &SubmissionResult);

    /// Called when an item could not be submitted (non-fatal)
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_item_submitted(&self, _item: &PendingItem, _result: &SubmissionResult) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
