//! Mock notification channel for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use indexflow::channel::NotificationChannel;
use indexflow::types::{ChannelKind, ChannelResult, FailureKind};
use std::collections::HashMap;
use std::sync::Mutex;

/// Simple mock channel for testing
///
/// Features:
/// - Accepts every URL unless told otherwise
/// - Call tracking for verification
/// - Configurable responses per URL
/// - Failure injection for every call
pub struct MockChannel {
    kind: ChannelKind,
    responses: Mutex<HashMap<String, ChannelResult>>,
    failure: Mutex<Option<ChannelResult>>,
    // Call tracking
    notify_calls: Mutex<Vec<String>>,
}

impl MockChannel {
    /// Create a new mock of the given kind
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            responses: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            notify_calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock IndexNow channel
    pub fn indexnow() -> Self {
        Self::new(ChannelKind::IndexNow)
    }

    /// Mock Google channel
    pub fn google() -> Self {
        Self::new(ChannelKind::Google)
    }

    // === Failure injection methods ===

    /// Make every `notify` call fail
    pub fn fail_with(&self, kind: FailureKind, message: &str) {
        *self.failure.lock().unwrap() = Some(ChannelResult::failure(kind, message));
    }

    /// Set the result for one URL
    pub fn set_response(&self, url: &str, result: ChannelResult) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), result);
    }

    // === Call verification methods ===

    /// All URLs `notify` was called with
    pub fn get_notify_calls(&self) -> Vec<String> {
        self.notify_calls.lock().unwrap().clone()
    }

    /// Number of `notify` calls
    pub fn call_count(&self) -> usize {
        self.notify_calls.lock().unwrap().len()
    }

    /// Assert `notify` was called exactly once with `url`
    pub fn assert_notified_once(&self, url: &str) {
        let calls = self.get_notify_calls();
        assert_eq!(calls, vec![url.to_string()], "{} calls", self.kind);
    }

    /// Assert `notify` was never called
    pub fn assert_not_called(&self) {
        let calls = self.get_notify_calls();
        assert!(calls.is_empty(), "{} unexpectedly called: {calls:?}", self.kind);
    }
}

#[async_trait]
impl NotificationChannel for MockChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn notify(&self, url: &str) -> ChannelResult {
        self.notify_calls.lock().unwrap().push(url.to_string());

        if let Some(result) = self.responses.lock().unwrap().get(url) {
            return result.clone();
        }
        if let Some(failure) = self.failure.lock().unwrap().clone() {
            return failure;
        }
        ChannelResult::success(
            Some(200),
            format!("{} accepted", self.kind),
            serde_json::json!({ "url": url }),
        )
    }
}
