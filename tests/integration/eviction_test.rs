//! Integration tests for eviction, its real-time event and the client reconciler.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;

use sessiongate_api::build_app;
use sessiongate_client::{
    EventListener, HttpSessionApi, Reconciler, ReconcilerState, TerminationReason,
};
use sessiongate_core::traits::SessionNotifier;
use sessiongate_core::types::{AccountId, SessionId};
use sessiongate_database::SessionStore;

use helpers::{TestApp, ids, token_for};

fn account(id: &str) -> AccountId {
    AccountId::parse(id).unwrap()
}

fn sid(id: &str) -> SessionId {
    SessionId::parse(id).unwrap()
}

#[tokio::test]
async fn test_limit_evict_retry_scenario() {
    let app = TestApp::new();
    let mut events = app.state.realtime.notifier.subscribe(&account("acct-a"));

    app.register("acct-a", "s1").await;
    app.register("acct-a", "s2").await;

    let response = app.register("acct-a", "s3").await;
    assert_eq!(response.body["status"], "limit_reached");
    assert_eq!(ids(&response.body["active_devices"]), ["s1", "s2"]);

    let response = app.evict("acct-a", "s1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    assert_eq!(response.body["notified"], true);

    let envelope = events.try_recv().expect("eviction event");
    assert_eq!(envelope.event, "session-change");
    assert_eq!(envelope.terminated_session_id(), Some(sid("s1")));

    let response = app.register("acct-a", "s3").await;
    assert_eq!(response.body["status"], "success");
    assert_eq!(app.active_ids("acct-a").await, ["s2", "s3"]);
}

#[tokio::test]
async fn test_evicted_session_is_gone_not_inactive() {
    let app = TestApp::new();
    app.register("acct-a", "s1").await;
    app.register("acct-a", "s2").await;

    app.evict("acct-a", "s1").await;

    assert_eq!(app.status("acct-a", "s1").await, "not_found");
    assert_eq!(app.status("acct-a", "s2").await, "active");
    assert!(app.store.get(&sid("s1")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_evicting_absent_session_succeeds_without_event() {
    let app = TestApp::new();
    let mut events = app.state.realtime.notifier.subscribe(&account("acct-a"));

    let response = app.evict("acct-a", "ghost").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    assert_eq!(response.body["notified"], false);
    assert!(events.try_recv().is_none());
}

#[tokio::test]
async fn test_evicting_twice_publishes_once() {
    let app = TestApp::new();
    let mut events = app.state.realtime.notifier.subscribe(&account("acct-a"));
    app.register("acct-a", "s1").await;

    app.evict("acct-a", "s1").await;
    app.evict("acct-a", "s1").await;

    assert!(events.try_recv().is_some());
    assert!(events.try_recv().is_none());
}

#[tokio::test]
async fn test_cross_account_eviction_is_forbidden() {
    let app = TestApp::new();
    let mut events = app.state.realtime.notifier.subscribe(&account("acct-a"));
    app.register("acct-a", "s1").await;

    let response = app.evict("acct-b", "s1").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");

    assert_eq!(app.status("acct-a", "s1").await, "active");
    assert!(events.try_recv().is_none());
}

#[tokio::test]
async fn test_event_reaches_only_the_evicting_account() {
    let app = TestApp::new();
    let mut other = app.state.realtime.notifier.subscribe(&account("acct-b"));
    app.register("acct-a", "s1").await;

    app.evict("acct-a", "s1").await;

    assert!(other.try_recv().is_none());
}

#[tokio::test]
async fn test_logout_keeps_the_row_while_eviction_removes_it() {
    let app = TestApp::new();
    app.register("acct-a", "s1").await;
    app.register("acct-a", "s2").await;

    app.request(
        "POST",
        "/api/session/logout",
        Some(&token_for("acct-a")),
        Some(serde_json::json!({ "session_id": "s2" })),
    )
    .await;
    app.evict("acct-a", "s1").await;

    assert!(app.active_ids("acct-a").await.is_empty());
    assert!(app.store.get(&sid("s2")).await.unwrap().is_some());
    assert!(app.store.get(&sid("s1")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_websocket_upgrade_requires_token() {
    let app = TestApp::new();
    let response = app.request("GET", "/ws", None, None).await;
    assert!(response.status.is_client_error());
}

/// Start the app on an ephemeral port.
async fn spawn_server(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_app(app.state.clone());
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{addr}")
}

async fn wait_for_subscriber(app: &TestApp, account_id: &AccountId) {
    for _ in 0..100 {
        if app.state.realtime.notifier.subscriber_count(account_id) > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("subscriber never attached");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tabs_reconcile_over_http_and_websocket() {
    let app = TestApp::new();
    let base = spawn_server(&app).await;
    let token = token_for("acct-a");

    let mut tab1 = Reconciler::new(
        HttpSessionApi::new(&base, token.as_str()).unwrap(),
        sid("s1"),
        Some("Tab one".into()),
    );
    let mut tab2 = Reconciler::new(
        HttpSessionApi::new(&base, token.as_str()).unwrap(),
        sid("s2"),
        Some("Tab two".into()),
    );
    let mut tab3 = Reconciler::new(
        HttpSessionApi::new(&base, token.as_str()).unwrap(),
        sid("s3"),
        Some("Tab three".into()),
    );

    assert_eq!(tab1.login().await.unwrap(), &ReconcilerState::Trusted);
    assert_eq!(tab2.login().await.unwrap(), &ReconcilerState::Trusted);

    let mut listener = EventListener::connect(tab1.api().base_url(), &token)
        .await
        .unwrap();
    wait_for_subscriber(&app, &account("acct-a")).await;

    match tab3.login().await.unwrap() {
        ReconcilerState::Conflict { candidates, .. } => {
            let listed: Vec<&str> = candidates.iter().map(|c| c.session_id.as_str()).collect();
            assert_eq!(listed, ["s1", "s2"]);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(
        tab3.resolve_conflict(&sid("s1")).await.unwrap(),
        &ReconcilerState::Trusted
    );

    let envelope = tokio::time::timeout(Duration::from_secs(5), listener.next_event())
        .await
        .expect("event in time")
        .unwrap()
        .expect("socket open");
    assert_eq!(
        tab1.on_event(&envelope),
        &ReconcilerState::Terminated {
            reason: TerminationReason::Evicted
        }
    );

    // The other tab only learns about its own session.
    assert_eq!(tab2.on_event(&envelope), &ReconcilerState::Trusted);
    assert_eq!(tab2.check_liveness().await.unwrap(), &ReconcilerState::Trusted);

    tab2.logout().await.unwrap();
    assert_eq!(app.status("acct-a", "s2").await, "inactive");

    listener.close().await.unwrap();
}
