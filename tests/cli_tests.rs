//! Binary smoke tests: every command against a temporary database

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// `indexflow` isolated from the caller's environment, with no channels configured
fn indexflow(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("indexflow").unwrap();
    cmd.current_dir(dir)
        .env_remove("INDEXNOW_API_KEY")
        .env_remove("GOOGLE_SERVICE_ACCOUNT_JSON")
        .env_remove("RUST_LOG")
        .env("DATABASE_PATH", dir.join("indexflow.db"));
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_health_reports_unconfigured_channels() {
    let dir = TempDir::new().unwrap();
    let health = json_output(indexflow(dir.path()).arg("health"));

    assert_eq!(health["status"], "ok");
    assert_eq!(health["schemaVersion"], "001_initial_schema");
    assert_eq!(health["channels"]["indexnowConfigured"], false);
    assert_eq!(health["channels"]["googleConfigured"], false);
    assert!(dir.path().join("indexflow.db").exists());
}

#[test]
fn test_health_sees_configured_key() {
    let dir = TempDir::new().unwrap();
    let health = json_output(
        indexflow(dir.path())
            .env("INDEXNOW_API_KEY", "abc123")
            .arg("health"),
    );

    assert_eq!(health["channels"]["indexnowConfigured"], true);
}

#[test]
fn test_db_flag_overrides_environment() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("nested").join("custom.db");

    indexflow(dir.path())
        .arg("--db")
        .arg(&custom)
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("healthy"));

    assert!(custom.exists());
}

#[test]
fn test_site_add_and_list_never_print_tokens() {
    let dir = TempDir::new().unwrap();
    indexflow(dir.path())
        .args(["site", "add", "S1", "--name", "a.com", "--token", "secret-token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered site"));

    let sites = json_output(indexflow(dir.path()).args(["site", "list"]));
    assert_eq!(sites[0]["siteId"], "S1");
    assert_eq!(sites[0]["siteName"], "a.com");

    indexflow(dir.path())
        .args(["site", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1").and(predicate::str::contains("secret").not()));
}

#[test]
fn test_submit_without_channels_stays_pending_then_dedups() {
    let dir = TempDir::new().unwrap();

    let first = json_output(indexflow(dir.path()).args(["submit", "https://a.com/p", "--site", "S1"]));
    assert_eq!(first["existing"], false);
    assert_eq!(first["success"], false);
    assert_eq!(first["indexnowStatus"], "pending");
    assert_eq!(first["googleStatus"], "pending");

    let second = json_output(indexflow(dir.path()).args(["submit", "https://a.com/p", "--site", "S1"]));
    assert_eq!(second["existing"], true);
    assert_eq!(second["submissionId"], first["submissionId"]);

    let list = json_output(indexflow(dir.path()).arg("list"));
    assert_eq!(list.as_array().unwrap().len(), 1);

    let id = first["submissionId"].as_str().unwrap();
    let shown = json_output(indexflow(dir.path()).args(["show", id]));
    assert_eq!(shown["url"], "https://a.com/p");
    assert_eq!(shown["site_id"], "S1");

    let stats = json_output(indexflow(dir.path()).args(["stats", "--site", "S1"]));
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["indexnowRate"], 0.0);
}

#[test]
fn test_invalid_url_returns_json_error() {
    let dir = TempDir::new().unwrap();
    let output = indexflow(dir.path())
        .args(["--json", "submit", "not-a-url", "--site", "S1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(body["error"].as_str().unwrap().contains("not-a-url"));
}

#[test]
fn test_show_missing_submission_fails() {
    let dir = TempDir::new().unwrap();
    indexflow(dir.path())
        .args(["show", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_resubmit_creates_fresh_row() {
    let dir = TempDir::new().unwrap();
    let first = json_output(indexflow(dir.path()).args(["submit", "https://a.com/p", "--site", "S1"]));
    let id = first["submissionId"].as_str().unwrap();

    indexflow(dir.path())
        .args(["--json", "resubmit", id])
        .assert()
        .failure()
        .stdout(predicate::str::contains("--yes"));

    let second = json_output(indexflow(dir.path()).args(["resubmit", id, "--yes"]));
    assert_ne!(second["submissionId"], first["submissionId"]);
    assert_eq!(second["existing"], false);

    let list = json_output(indexflow(dir.path()).arg("list"));
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_event_flow_from_file_and_stdin() {
    let dir = TempDir::new().unwrap();
    indexflow(dir.path())
        .args(["site", "add", "S1", "--name", "a.com", "--token", "t"])
        .assert()
        .success();

    let payload = dir.path().join("item.json");
    std::fs::write(
        &payload,
        r#"{"site": "S1", "_id": "I1", "collectionId": "C1", "slug": "/blog/x", "isDraft": false}"#,
    )
    .unwrap();

    let tracked = json_output(
        indexflow(dir.path())
            .args(["event", "item-changed"])
            .arg(&payload),
    );
    assert_eq!(tracked["outcome"], "tracked");
    assert_eq!(tracked["item"]["url"], "/blog/x");

    let published = json_output(
        indexflow(dir.path())
            .args(["event", "site-publish", "-"])
            .write_stdin(r#"{"site": "S1"}"#),
    );
    assert_eq!(published["outcome"], "published");
    assert_eq!(published["submissions"][0]["url"], "https://a.com/blog/x");

    let again = json_output(
        indexflow(dir.path())
            .args(["event", "site-publish", "-"])
            .write_stdin(r#"{"site": "S1"}"#),
    );
    assert_eq!(again["submissions"].as_array().unwrap().len(), 0);

    let unpublished = json_output(
        indexflow(dir.path())
            .args(["event", "item-unpublished", "-"])
            .write_stdin(r#"{"site": "S1", "_id": "I1"}"#),
    );
    assert_eq!(unpublished["outcome"], "unpublished");
    assert_eq!(unpublished["tracked"], false);
}

#[test]
fn test_event_for_unregistered_site_is_ignored() {
    let dir = TempDir::new().unwrap();
    indexflow(dir.path())
        .args(["event", "site-publish", "-"])
        .write_stdin(r#"{"site": "nobody"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignored"));
}
