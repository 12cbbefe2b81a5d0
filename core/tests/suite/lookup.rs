use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use core_test_support::backend_for;
use core_test_support::mount_user;
use core_test_support::mount_user_missing;
use core_test_support::player_json;
use core_test_support::recv_within;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::unbounded_channel;
use warden_core::LookupRoot;
use warden_core::LookupState;
use warden_core::PlayerKey;
use warden_core::RootId;
use warden_core::lookup::ApplyOutcome;
use warden_core::lookup::NOT_FOUND_NOTICE;
use warden_core::lookup::Notifier;
use warden_core::lookup::spawn_resolver;
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl Notifier for Notices {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pivot_supersedes_slow_resolution() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/User"))
        .and(query_param("ckey", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(player_json(1, "slow"))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_user(&server, "ckey", "fast", player_json(2, "fast")).await;

    let (tx, mut rx) = unbounded_channel();
    let loader = spawn_resolver(Arc::new(backend_for(&server)?), move |completion| {
        let _ = tx.send(completion);
    });
    let mut root = LookupRoot::new(RootId::next(), loader, Arc::new(Notices::default()));

    root.submit(PlayerKey::ckey("slow"));
    root.pivot(PlayerKey::ckey("fast"));

    let completion = recv_within(&mut rx, WAIT).await;
    assert_eq!(completion.key, PlayerKey::ckey("fast"));
    assert_eq!(root.apply(completion), ApplyOutcome::Applied);
    assert_eq!(
        root.displayed_record().map(|record| record.ckey.as_str()),
        Some("fast")
    );

    // The superseded request was cancelled, so nothing else arrives.
    let late = tokio::time::timeout(Duration::from_millis(800), rx.recv()).await;
    assert!(late.is_err(), "cancelled resolution still reported");
    Ok(())
}

#[tokio::test]
async fn not_found_closes_nested_lookup() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    mount_user_missing(&server, "ckey", "ghost").await;

    let (tx, mut rx) = unbounded_channel();
    let loader = spawn_resolver(Arc::new(backend_for(&server)?), move |completion| {
        let _ = tx.send(completion);
    });
    let notices = Arc::new(Notices::default());
    let closed = Arc::new(Mutex::new(false));
    let closed_flag = Arc::clone(&closed);
    let mut nested = LookupRoot::new(RootId::next(), loader, notices.clone())
        .with_close_handler(Box::new(move || *closed_flag.lock().unwrap() = true))
        .with_initial_key(Some(PlayerKey::ckey("ghost")));

    let completion = recv_within(&mut rx, WAIT).await;
    nested.apply(completion);

    assert_eq!(nested.state(), &LookupState::NotFound);
    assert!(*closed.lock().unwrap());
    assert_eq!(*notices.0.lock().unwrap(), vec![NOT_FOUND_NOTICE.to_string()]);
    Ok(())
}
