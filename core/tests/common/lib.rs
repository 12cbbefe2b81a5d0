//! Shared fixtures for the warden-core integration tests: canned backend
//! payloads and a wiremock server wired to an [`HttpBackend`].

use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use warden_core::HttpBackend;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

pub async fn start_mock_server() -> MockServer {
    MockServer::builder()
        .body_print_limit(wiremock::BodyPrintLimit::Limited(80_000))
        .start()
        .await
}

pub fn backend_for(server: &MockServer) -> anyhow::Result<HttpBackend> {
    Ok(HttpBackend::new(&server.uri())?)
}

/// Minimal player payload in the backend's camelCase shape.
pub fn player_json(id: i64, ckey: &str) -> Value {
    json!({
        "id": id,
        "ckey": ckey,
        "lastLogin": "2024-05-01 18:00:00",
        "isPermabanned": false,
        "isTimeBanned": false,
        "lastKnownIp": "10.0.0.7",
        "lastKnownCid": "2001122334",
        "migratedNotes": true,
        "migratedBans": true,
        "notes": [],
        "jobBans": []
    })
}

/// `player_json` with the given fields merged over it.
pub fn player_with(id: i64, ckey: &str, overrides: Value) -> Value {
    let mut player = player_json(id, ckey);
    if let (Some(target), Value::Object(fields)) = (player.as_object_mut(), overrides) {
        target.extend(fields);
    }
    player
}

pub fn note_json(id: i64, text: &str, category: i64) -> Value {
    json!({
        "id": id,
        "playerId": 1,
        "adminId": 2,
        "text": text,
        "date": "2024-04-01",
        "isBan": false,
        "isConfidential": false,
        "adminRank": "Moderator",
        "noteCategory": category,
        "notingAdminCkey": "modguy"
    })
}

/// Serve `body` for `GET /User?{param}={value}`.
pub async fn mount_user(server: &MockServer, param: &str, value: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/User"))
        .and(query_param(param, value))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_user_missing(server: &MockServer, param: &str, value: &str) {
    Mock::given(method("GET"))
        .and(path("/User"))
        .and(query_param(param, value))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Wait for the next message, failing the test instead of hanging.
pub async fn recv_within<T>(rx: &mut UnboundedReceiver<T>, wait: Duration) -> T {
    match tokio::time::timeout(wait, rx.recv()).await {
        Ok(Some(value)) => value,
        Ok(None) => panic!("channel closed before a message arrived"),
        Err(_) => panic!("timed out after {wait:?} waiting for a message"),
    }
}
