use chrono::TimeZone;
use chrono::Utc;
use core_test_support::backend_for;
use core_test_support::mount_user;
use core_test_support::mount_user_missing;
use core_test_support::player_json;
use core_test_support::player_with;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use warden_core::BackendClient;
use warden_core::BanDisplayState;
use warden_core::LookupError;
use warden_core::PlayerKey;
use warden_core::Resolution;
use warden_core::ban_state;
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

#[tokio::test]
async fn resolves_by_ckey() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    mount_user(&server, "ckey", "alice", player_json(1, "alice")).await;

    let backend = backend_for(&server)?;
    let Resolution::Found(record) = backend.resolve(&PlayerKey::ckey("alice")).await? else {
        panic!("expected alice to resolve");
    };
    assert_eq!(record.id, 1);
    assert_eq!(record.ckey, "alice");
    assert_eq!(record.last_known_cid, "2001122334");
    Ok(())
}

#[tokio::test]
async fn resolves_by_discord_id() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    let body = player_with(4, "linked", json!({ "discordId": 123456789012345678u64 }));
    mount_user(&server, "discordId", "123456789012345678", body).await;

    let backend = backend_for(&server)?;
    let resolution = backend
        .resolve(&PlayerKey::DiscordId(123_456_789_012_345_678))
        .await?;
    let Resolution::Found(record) = resolution else {
        panic!("expected discord id to resolve");
    };
    assert_eq!(record.ckey, "linked");
    assert_eq!(record.discord_id, Some(123_456_789_012_345_678));
    Ok(())
}

#[tokio::test]
async fn null_strings_still_resolve() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    let body = player_with(
        5,
        "sparse",
        json!({
            "lastKnownIp": null,
            "notes": [{ "id": 1, "text": "watch", "adminRank": null }]
        }),
    );
    mount_user(&server, "ckey", "sparse", body).await;

    let backend = backend_for(&server)?;
    let Resolution::Found(record) = backend.resolve(&PlayerKey::ckey("sparse")).await? else {
        panic!("expected sparse to resolve");
    };
    assert_eq!(record.last_known_ip, "");
    assert_eq!(record.notes[0].admin_rank, "");
    Ok(())
}

#[tokio::test]
async fn missing_player_is_not_found() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    mount_user_missing(&server, "ckey", "Alice").await;

    let backend = backend_for(&server)?;
    assert_eq!(
        backend.resolve(&PlayerKey::ckey("Alice")).await?,
        Resolution::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn server_error_is_reported() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/User"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let err = backend
        .resolve(&PlayerKey::ckey("alice"))
        .await
        .expect_err("503 should fail");
    assert!(matches!(err, LookupError::Status { status: 503, .. }));
    assert_eq!(err.summary(), "Backend returned HTTP 503.");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/User"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let err = backend
        .resolve(&PlayerKey::ckey("alice"))
        .await
        .expect_err("html is not a player");
    assert!(matches!(err, LookupError::Decode(_)));
    Ok(())
}

#[tokio::test]
async fn expired_temp_ban_is_not_displayed() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    let body = player_with(
        2,
        "Bob",
        json!({
            "isTimeBanned": true,
            "timeBanReason": "spam",
            "timeBanAdminCkey": "modguy",
            "timeBanExpiration": 60
        }),
    );
    mount_user(&server, "ckey", "Bob", body).await;

    let backend = backend_for(&server)?;
    let Resolution::Found(record) = backend.resolve(&PlayerKey::ckey("Bob")).await? else {
        panic!("expected Bob to resolve");
    };

    let lifted = Utc.with_ymd_and_hms(2000, 1, 1, 1, 0, 0).unwrap();
    assert_eq!(
        ban_state::evaluate(&record, lifted),
        BanDisplayState::TemporaryExpired
    );
    let before = Utc.with_ymd_and_hms(2000, 1, 1, 0, 59, 59).unwrap();
    assert!(ban_state::evaluate(&record, before).is_displayed());
    Ok(())
}
