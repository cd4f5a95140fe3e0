//! IndexNow wire contract against a mock HTTP server

use indexflow::channel::{IndexNowClient, NotificationChannel, MAX_URLS_PER_REQUEST};
use indexflow::types::{ChannelKind, ChannelResult, FailureKind};
use mockito::{Matcher, Server};
use serde_json::json;

const KEY: &str = "0123456789abcdef";

fn client_for(server: &Server) -> IndexNowClient {
    IndexNowClient::new(KEY).with_endpoint(format!("{}/indexnow", server.url()))
}

#[tokio::test]
async fn test_push_url_sends_protocol_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/indexnow")
        .match_header("content-type", Matcher::Regex("application/json".into()))
        .match_body(Matcher::Json(json!({
            "host": "www.example.com",
            "key": KEY,
            "keyLocation": format!("https://www.example.com/{KEY}.txt"),
            "urlList": ["https://www.example.com/blog/post"]
        })))
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.push_url("https://www.example.com/blog/post").await;

    mock.assert_async().await;
    assert!(result.is_success(), "{result:?}");
    assert_eq!(result.message(), "URL(s) submitted successfully");
    assert_eq!(client.kind(), ChannelKind::IndexNow);
}

#[tokio::test]
async fn test_accepted_is_success() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/indexnow")
        .with_status(202)
        .create_async()
        .await;

    let result = client_for(&server).notify("https://a.com/p").await;

    assert_eq!(
        result,
        ChannelResult::success(
            Some(202),
            "URL(s) received",
            json!({ "urls": ["https://a.com/p"] })
        )
    );
}

#[tokio::test]
async fn test_rejection_carries_body_and_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/indexnow")
        .with_status(403)
        .with_body("Key not valid")
        .create_async()
        .await;

    let result = client_for(&server).push_url("https://a.com/p").await;

    assert_eq!(
        result,
        ChannelResult::failure(FailureKind::Rejected, "Key not valid").with_code(403)
    );
}

#[tokio::test]
async fn test_rejection_without_body_uses_default_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/indexnow")
        .with_status(422)
        .create_async()
        .await;

    let result = client_for(&server).push_url("https://a.com/p").await;

    assert_eq!(result.message(), "IndexNow submission failed");
    assert!(matches!(
        result,
        ChannelResult::Failure {
            kind: FailureKind::Rejected,
            code: Some(422),
            ..
        }
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    let client = IndexNowClient::new(KEY).with_endpoint("http://127.0.0.1:1/indexnow");
    let result = client.push_url("https://a.com/p").await;

    assert!(matches!(
        result,
        ChannelResult::Failure {
            kind: FailureKind::Transport,
            ..
        }
    ));
}

#[tokio::test]
async fn test_large_batch_is_chunked() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/indexnow")
        .match_body(Matcher::PartialJson(json!({ "host": "a.com" })))
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let urls: Vec<String> = (0..=MAX_URLS_PER_REQUEST)
        .map(|n| format!("https://a.com/page/{n}"))
        .collect();
    let report = client_for(&server).push_batch(&urls).await;

    mock.assert_async().await;
    assert!(report.success);
    assert_eq!(report.total_urls, MAX_URLS_PER_REQUEST + 1);
    assert_eq!(report.chunks.len(), 2);
}

#[tokio::test]
async fn test_batch_fails_if_any_chunk_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/indexnow")
        .match_body(Matcher::Regex("page/0\"".into()))
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("POST", "/indexnow")
        .match_body(Matcher::Regex(format!("page/{MAX_URLS_PER_REQUEST}\"")))
        .with_status(429)
        .with_body("Too Many Requests")
        .create_async()
        .await;

    let urls: Vec<String> = (0..=MAX_URLS_PER_REQUEST)
        .map(|n| format!("https://a.com/page/{n}"))
        .collect();
    let report = client_for(&server).push(&urls, "a.com").await;

    assert!(!report.success);
    assert!(report.chunks[0].is_success());
    assert_eq!(report.chunks[1].message(), "Too Many Requests");
}
