//! Google Indexing API channel
//!
//! Authenticates with a service account: a signed RS256 assertion is
//! exchanged for a short-lived access token, cached until shortly before it
//! expires. The credential is only parsed on first use (or an explicit
//! [`GoogleIndexingClient::init`]), so a broken credential shows up as a
//! failed channel result rather than a startup error.

use crate::channel::{http_client, NotificationChannel};
use crate::error::{Error, Result};
use crate::types::{ChannelKind, ChannelResult, FailureKind};
use async_trait::async_trait;
use futures::future::join_all;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// URL notification endpoint base
pub const INDEXING_ENDPOINT: &str = "https://indexing.googleapis.com/v3/urlNotifications";

/// OAuth scope required by the Indexing API
pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";

/// URLs published concurrently per group in [`GoogleIndexingClient::publish_batch`]
pub const GOOGLE_BATCH_SIZE: usize = 100;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const MAX_TOKEN_LIFETIME_SECS: u64 = 86_400;
const NOT_CONFIGURED: &str = "Google Indexing API not configured";

/// Direction of a URL notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationMode {
    /// URL was added or changed
    #[serde(rename = "URL_UPDATED")]
    Updated,
    /// URL was removed
    #[serde(rename = "URL_DELETED")]
    Deleted,
}

/// Result for one URL of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlOutcome {
    /// URL that was published
    pub url: String,
    /// What the API said about it
    pub result: ChannelResult,
}

/// Outcome of [`GoogleIndexingClient::publish_batch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPublishReport {
    /// Every URL succeeded
    pub success: bool,
    /// Number of URLs attempted
    pub total_urls: usize,
    /// URLs accepted
    pub success_count: usize,
    /// URLs rejected or not attempted
    pub failure_count: usize,
    /// Per-URL outcomes, in input order
    pub results: Vec<UrlOutcome>,
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

struct Signer {
    client_email: String,
    token_uri: String,
    key: EncodingKey,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

const fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Serialize)]
struct PublishPayload<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    mode: NotificationMode,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Why a call failed, before it becomes a [`ChannelResult`]
struct CallFailure {
    kind: FailureKind,
    message: String,
    code: Option<i64>,
}

impl CallFailure {
    fn into_result(self) -> ChannelResult {
        let result = ChannelResult::failure(self.kind, self.message);
        match self.code {
            Some(code) => result.with_code(code),
            None => result,
        }
    }
}

impl From<reqwest::Error> for CallFailure {
    fn from(e: reqwest::Error) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: e.to_string(),
            code: e.status().map(|s| i64::from(s.as_u16())),
        }
    }
}

/// Google Indexing client using reqwest
pub struct GoogleIndexingClient {
    http: Client,
    credential: Option<String>,
    endpoint: String,
    signer: OnceLock<Signer>,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleIndexingClient {
    /// Create a client from a service-account JSON credential
    pub fn new(credential: impl Into<String>) -> Self {
        Self::with_credential(Some(credential.into()))
    }

    /// Create a client whose credential may be absent
    ///
    /// Without a credential every call returns a `not_configured` failure.
    pub fn with_credential(credential: Option<String>) -> Self {
        Self {
            http: http_client(),
            credential,
            endpoint: INDEXING_ENDPOINT.to_string(),
            signer: OnceLock::new(),
            token: Mutex::new(None),
        }
    }

    /// Send notifications to a different endpoint base (tests)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Parse the credential and prepare the signing key
    ///
    /// Idempotent; a failed attempt can be retried on the next call.
    pub fn init(&self) -> Result<()> {
        if self.signer.get().is_some() {
            return Ok(());
        }

        let credential = self
            .credential
            .as_deref()
            .ok_or_else(|| Error::ConfigurationMissing(NOT_CONFIGURED.to_string()))?;

        let account: ServiceAccountKey = serde_json::from_str(credential).map_err(|e| {
            Error::ConfigurationMissing(format!("unreadable Google service account JSON: {e}"))
        })?;
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
            Error::ConfigurationMissing(format!("unusable Google service account key: {e}"))
        })?;

        let signer = Signer {
            client_email: account.client_email,
            token_uri: account
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            key,
        };
        let signer = self.signer.get_or_init(|| signer);
        info!("Google Indexing API initialized for {}", signer.client_email);
        Ok(())
    }

    /// Whether the credential has been parsed successfully
    pub fn is_ready(&self) -> bool {
        self.signer.get().is_some()
    }

    /// Notify Google that `url` was updated or deleted
    pub async fn publish(&self, url: &str, mode: NotificationMode) -> ChannelResult {
        debug!("Google: submitting {url} ({mode:?})");
        match self.try_publish(url, mode).await {
            Ok(data) => {
                let meta = &data["urlNotificationMetadata"];
                debug!(
                    "Google: accepted {} (latest update: {})",
                    meta["url"].as_str().unwrap_or(url),
                    meta["latestUpdate"]
                );
                ChannelResult::success(Some(200), "URL notification accepted", data)
            }
            Err(failure) => {
                warn!("Google: error submitting {url}: {}", failure.message);
                failure.into_result()
            }
        }
    }

    /// Ask Google to drop `url` from its index
    pub async fn remove_from_index(&self, url: &str) -> ChannelResult {
        self.publish(url, NotificationMode::Deleted).await
    }

    /// Latest notification metadata Google holds for `url`
    pub async fn get_metadata(&self, url: &str) -> ChannelResult {
        let request_url = format!(
            "{}/metadata?url={}",
            self.endpoint,
            urlencoding::encode(url)
        );

        let outcome = async {
            let token = self.access_token().await?;
            let response = self.http.get(&request_url).bearer_auth(token).send().await?;
            read_api_response(response).await
        }
        .await;

        match outcome {
            Ok(data) => ChannelResult::success(Some(200), "URL notification metadata", data),
            Err(failure) => {
                warn!("Google: error getting status for {url}: {}", failure.message);
                failure.into_result()
            }
        }
    }

    /// Publish many URLs
    ///
    /// URLs go out in groups of [`GOOGLE_BATCH_SIZE`], concurrently within a
    /// group. Every URL gets its own outcome; one failure never stops the rest.
    pub async fn publish_batch(&self, urls: &[String], mode: NotificationMode) -> BatchPublishReport {
        let mut results = Vec::with_capacity(urls.len());

        for group in urls.chunks(GOOGLE_BATCH_SIZE) {
            let outcomes = join_all(group.iter().map(|url| self.publish(url, mode))).await;
            results.extend(group.iter().zip(outcomes).map(|(url, result)| UrlOutcome {
                url: url.clone(),
                result,
            }));
        }

        let success_count = results.iter().filter(|r| r.result.is_success()).count();
        BatchPublishReport {
            success: success_count == urls.len(),
            total_urls: urls.len(),
            success_count,
            failure_count: urls.len() - success_count,
            results,
        }
    }

    async fn try_publish(
        &self,
        url: &str,
        mode: NotificationMode,
    ) -> std::result::Result<serde_json::Value, CallFailure> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!("{}:publish", self.endpoint))
            .bearer_auth(token)
            .json(&PublishPayload { url, mode })
            .send()
            .await?;
        read_api_response(response).await
    }

    async fn access_token(&self) -> std::result::Result<String, CallFailure> {
        self.init().map_err(|e| CallFailure {
            kind: FailureKind::NotConfigured,
            message: match e {
                Error::ConfigurationMissing(message) => message,
                other => other.to_string(),
            },
            code: None,
        })?;
        let Some(signer) = self.signer.get() else {
            return Err(CallFailure {
                kind: FailureKind::NotConfigured,
                message: NOT_CONFIGURED.to_string(),
                code: None,
            });
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let token = fetch_token(&self.http, signer).await?;
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: expiry_after(token.expires_in),
        });
        Ok(value)
    }
}

/// When a token issued now with a lifetime of `expires_in` seconds expires
///
/// Lifetimes are capped at a day; Google issues one-hour tokens.
fn expiry_after(expires_in: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in.min(MAX_TOKEN_LIFETIME_SECS));
    let now = Instant::now();
    now.checked_add(lifetime).unwrap_or(now)
}

async fn fetch_token(
    http: &Client,
    signer: &Signer,
) -> std::result::Result<TokenResponse, CallFailure> {
    let now = chrono::Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: &signer.client_email,
        scope: INDEXING_SCOPE,
        aud: &signer.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signer.key)
        .map_err(|e| CallFailure {
            kind: FailureKind::NotConfigured,
            message: format!("failed to sign token request: {e}"),
            code: None,
        })?;

    debug!("Google: requesting access token from {}", signer.token_uri);
    let response = http
        .post(&signer.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OAuthErrorBody>(&body).map_or_else(
        |_| format!("token request failed with status {status}"),
        |e| e.error_description.unwrap_or(e.error),
    );
    Err(CallFailure {
        kind: FailureKind::Rejected,
        message,
        code: Some(i64::from(status.as_u16())),
    })
}

/// Decode an API response, unwrapping Google's `{"error": {...}}` shape on failure
async fn read_api_response(
    response: Response,
) -> std::result::Result<serde_json::Value, CallFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let generic = || CallFailure {
        kind: FailureKind::Rejected,
        message: format!("request failed with status {status}"),
        code: Some(i64::from(status.as_u16())),
    };

    Err(match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(ApiErrorBody { error }) => {
            let fallback = generic();
            CallFailure {
                kind: FailureKind::Rejected,
                message: error.message.unwrap_or(fallback.message),
                code: error.code.or(fallback.code),
            }
        }
        Err(_) => generic(),
    })
}

#[async_trait]
impl NotificationChannel for GoogleIndexingClient {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Google
    }

    async fn notify(&self, url: &str) -> ChannelResult {
        self.publish(url, NotificationMode::Updated).await
    }
}
