//! IndexNow channel
//!
//! One POST notifies every participating engine (Bing, Yandex, Seznam, Naver).
//! The key must also be served at `https://{host}/{key}.txt` for engines to
//! accept submissions.

use crate::channel::{http_client, NotificationChannel};
use crate::types::{ChannelKind, ChannelResult, FailureKind};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shared IndexNow endpoint
pub const INDEXNOW_ENDPOINT: &str = "https://api.indexnow.org/indexnow";

/// Most URLs IndexNow accepts in a single request
pub const MAX_URLS_PER_REQUEST: usize = 10_000;

/// IndexNow client using reqwest
pub struct IndexNowClient {
    client: Client,
    key: String,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PushPayload<'a> {
    host: &'a str,
    key: &'a str,
    key_location: String,
    url_list: &'a [String],
}

/// Outcome of a (possibly chunked) IndexNow push
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexNowReport {
    /// Every chunk succeeded
    pub success: bool,
    /// Number of URLs in the push
    pub total_urls: usize,
    /// One result per request sent, in order
    pub chunks: Vec<ChannelResult>,
}

/// Where IndexNow expects to find the key file for `host`
pub fn key_location(host: &str, key: &str) -> String {
    format!("https://{host}/{key}.txt")
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}

impl IndexNowClient {
    /// Create a new IndexNow client
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            key: key.into(),
            endpoint: INDEXNOW_ENDPOINT.to_string(),
        }
    }

    /// Send requests to a different endpoint (self-hosted engines, tests)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Push URLs belonging to `host`
    ///
    /// Lists longer than [`MAX_URLS_PER_REQUEST`] are split into several
    /// requests, sent one after another. The push succeeds only if every
    /// request does.
    pub async fn push(&self, urls: &[String], host: &str) -> IndexNowReport {
        let mut chunks = Vec::with_capacity(urls.len().div_ceil(MAX_URLS_PER_REQUEST));
        for chunk in urls.chunks(MAX_URLS_PER_REQUEST) {
            chunks.push(self.post(chunk, host).await);
        }

        IndexNowReport {
            success: !chunks.is_empty() && chunks.iter().all(ChannelResult::is_success),
            total_urls: urls.len(),
            chunks,
        }
    }

    /// Push a single URL, taking the host from the URL itself
    pub async fn push_url(&self, url: &str) -> ChannelResult {
        let Some(host) = host_of(url) else {
            warn!("IndexNow: invalid URL {url}");
            return ChannelResult::failure(FailureKind::InvalidUrl, "Invalid URL format");
        };
        self.post(&[url.to_string()], &host).await
    }

    /// Push a list of URLs, taking the host from the first one
    pub async fn push_batch(&self, urls: &[String]) -> IndexNowReport {
        let failed = |message: &str| IndexNowReport {
            success: false,
            total_urls: urls.len(),
            chunks: vec![ChannelResult::failure(FailureKind::InvalidUrl, message)],
        };

        let Some(first) = urls.first() else {
            return failed("No URLs provided");
        };
        let Some(host) = host_of(first) else {
            return failed("Invalid URL format");
        };

        self.push(urls, &host).await
    }

    async fn post(&self, urls: &[String], host: &str) -> ChannelResult {
        let payload = PushPayload {
            host,
            key: &self.key,
            key_location: key_location(host, &self.key),
            url_list: urls,
        };

        debug!("IndexNow: submitting {} URL(s) for {host}", urls.len());

        let response = match self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("IndexNow: request failed: {e}");
                return ChannelResult::failure(FailureKind::Transport, e.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            let message = if status == StatusCode::OK {
                "URL(s) submitted successfully"
            } else {
                "URL(s) received"
            };
            debug!("IndexNow: {status} for {} URL(s)", urls.len());
            return ChannelResult::success(
                Some(status.as_u16()),
                message,
                serde_json::json!({ "urls": urls }),
            );
        }

        let body = response.text().await.unwrap_or_default();
        warn!("IndexNow: rejected with {status}: {body}");
        let message = if body.trim().is_empty() {
            "IndexNow submission failed".to_string()
        } else {
            body
        };
        ChannelResult::failure(FailureKind::Rejected, message).with_code(i64::from(status.as_u16()))
    }
}

#[async_trait]
impl NotificationChannel for IndexNowClient {
    fn kind(&self) -> ChannelKind {
        ChannelKind::IndexNow
    }

    async fn notify(&self, url: &str) -> ChannelResult {
        self.push_url(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_location() {
        assert_eq!(
            key_location("www.example.com", "abc123"),
            "https://www.example.com/abc123.txt"
        );
    }

    #[test]
    fn test_payload_field_names() {
        let urls = vec!["https://www.example.com/a".to_string()];
        let payload = PushPayload {
            host: "www.example.com",
            key: "abc123",
            key_location: key_location("www.example.com", "abc123"),
            url_list: &urls,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "host": "www.example.com",
                "key": "abc123",
                "keyLocation": "https://www.example.com/abc123.txt",
                "urlList": ["https://www.example.com/a"]
            })
        );
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://a.com/p?q=1").as_deref(), Some("a.com"));
        assert_eq!(host_of("/relative/path"), None);
        assert_eq!(host_of("not a url"), None);
    }

    #[tokio::test]
    async fn test_push_url_invalid_is_structured_failure() {
        let client = IndexNowClient::new("abc123").with_endpoint("http://127.0.0.1:9/unused");
        let result = client.push_url("definitely not a url").await;

        assert_eq!(
            result,
            ChannelResult::failure(FailureKind::InvalidUrl, "Invalid URL format")
        );
    }

    #[tokio::test]
    async fn test_push_batch_empty() {
        let client = IndexNowClient::new("abc123");
        let report = client.push_batch(&[]).await;

        assert!(!report.success);
        assert_eq!(report.total_urls, 0);
        assert_eq!(report.chunks[0].message(), "No URLs provided");
    }
}
