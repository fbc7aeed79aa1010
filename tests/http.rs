//! End-to-end tests of the `run` server's HTTP service.

use std::sync::Arc;

use tsdbd::config::BuildInfo;
use tsdbd::server::{RunCommand, Server};
use tsdbd::tsdb::builtin_engines;

mod common;

async fn started(dir: &std::path::Path) -> Arc<RunCommand> {
    let config = common::write_config(dir, "");
    let server = Arc::new(RunCommand::new(
        BuildInfo::new(Some("1.2.3"), Some("abc123"), Some("main")),
        builtin_engines().unwrap(),
    ));
    server
        .start(&common::args(&["--config", config.to_str().unwrap()]))
        .await
        .unwrap();
    server
}

#[tokio::test]
async fn test_ping_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let server = started(dir.path()).await;
    let addr = server.http_addr().unwrap();

    let res = reqwest::get(format!("http://{addr}/ping")).await.unwrap();
    assert_eq!(res.status(), 204);
    assert_eq!(res.headers()["x-tsdb-version"], "1.2.3");

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_health_and_debug_vars() {
    let dir = tempfile::tempdir().unwrap();
    let server = started(dir.path()).await;
    let addr = server.http_addr().unwrap();

    let health: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "pass");
    assert_eq!(health["commit"], "abc123");

    let vars: serde_json::Value = reqwest::get(format!("http://{addr}/debug/vars"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = vars["statistics"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert!(names.contains(&"store"));
    assert!(names.contains(&"httpd"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_written_points_are_queryable_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let server = started(dir.path()).await;
    let addr = server.http_addr().unwrap();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/write"))
        .json(&serde_json::json!([
            { "series": "cpu", "timestamp": 20, "value": 0.5 },
            { "series": "cpu", "timestamp": 10, "value": 0.25 },
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let body: serde_json::Value = client
        .get(format!("http://{addr}/query?series=cpu"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stamps: Vec<i64> = body["points"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["timestamp"].as_i64())
        .collect();
    assert_eq!(stamps, vec![10, 20]);

    let bad = client
        .post(format!("http://{addr}/write"))
        .body("not json")
        .header("content-type", "application/json")
        .send()
        .await
        .unwrap();
    assert!(bad.status().is_client_error());

    server.close().await.unwrap();
    let snapshot = std::fs::read_to_string(dir.path().join("data/inmem.json")).unwrap();
    assert!(snapshot.contains("cpu"));
}

#[tokio::test]
async fn test_close_stops_http_service() {
    let dir = tempfile::tempdir().unwrap();
    let server = started(dir.path()).await;
    let addr = server.http_addr().unwrap();

    server.close().await.unwrap();
    assert!(server.closed().is_closed());
    assert!(reqwest::get(format!("http://{addr}/ping")).await.is_err());
}
