use core_test_support::backend_for;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use warden_core::BackendClient;
use warden_core::ConnectionQuery;
use warden_core::connections::ConnectionPanel;
use warden_core::connections::SummaryItem;
use warden_core::connections::summary_groups;
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

#[tokio::test]
async fn full_history_by_all_cids() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/Connections/FullByAllCid"))
        .and(query_param("ckey", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "allCids": ["111", "222"],
            "triplets": [
                { "ckey": "alice", "lastKnownCid": "111", "lastKnownIp": "1.2.3.4", "loginDate": "2024-01-02" },
                { "ckey": "alt", "lastKnownCid": "222", "lastKnownIp": "1.2.3.5", "loginDate": "2024-01-03" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let view = backend
        .connections(ConnectionQuery::ByAllCidsFull, "alice")
        .await?;

    assert_eq!(
        summary_groups(&view),
        vec![SummaryItem::Group {
            label: "View All CIDs",
            values: "111, 222".to_string(),
        }]
    );
    let panel = ConnectionPanel::Loaded(view);
    let ckeys: Vec<&str> = panel.triplets().iter().map(|t| t.ckey.as_str()).collect();
    assert_eq!(ckeys, vec!["alice", "alt"]);
    Ok(())
}

#[tokio::test]
async fn each_mode_hits_its_own_path() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    for query in ConnectionQuery::ALL {
        Mock::given(method("GET"))
            .and(path(query.path()))
            .and(query_param("ckey", "bob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "triplets": [] })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let backend = backend_for(&server)?;
    for query in ConnectionQuery::ALL {
        let view = backend.connections(query, "bob").await?;
        assert_eq!(view.triplets, Some(Vec::new()));
    }
    Ok(())
}

#[tokio::test]
async fn failed_fetch_becomes_retryable_panel() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/Connections/Ckey"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let panel =
        ConnectionPanel::from_result(backend.connections(ConnectionQuery::ByCkeyFull, "x").await);
    assert_eq!(
        panel,
        ConnectionPanel::Failed("Backend returned HTTP 500.".to_string())
    );
    assert!(panel.can_retry());
    Ok(())
}
