//! Integration tests for registration under the per-account device cap.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{CHROME_UA, TestApp, ids, test_config, token_for};

#[tokio::test]
async fn test_root_reports_ok() {
    let app = TestApp::new();
    let response = app.request("GET", "/", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_health_reports_version() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"], "connected");
    assert_eq!(response.body["ws_connections"], 0);
}

#[tokio::test]
async fn test_register_requires_bearer_token() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/session/register",
            None,
            Some(json!({ "session_id": "s1" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");

    let response = app
        .request(
            "POST",
            "/api/session/register",
            Some("not-a-jwt"),
            Some(json!({ "session_id": "s1" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_blank_session_id_is_rejected_without_mutation() {
    let app = TestApp::new();
    let response = app.register("acct-a", "   ").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_REQUEST");

    let response = app
        .request(
            "POST",
            "/api/session/register",
            Some(&token_for("acct-a")),
            Some(json!({ "device_info": "no id" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_status_without_session_id_is_a_json_error() {
    let app = TestApp::new();
    let token = token_for("acct-a");

    for uri in ["/api/session/status", "/api/session/status?session_id="] {
        let response = app.request("GET", uri, Some(&token), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "INVALID_REQUEST");
    }
}

#[tokio::test]
async fn test_third_device_gets_limit_reached_with_candidates() {
    let app = TestApp::new();

    for sid in ["s1", "s2"] {
        let response = app.register("acct-a", sid).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "success");
    }

    let response = app.register("acct-a", "s3").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "limit_reached");
    assert_eq!(ids(&response.body["active_devices"]), ["s1", "s2"]);
    assert_eq!(response.body["active_devices"][0]["device_info"], "device s1");

    assert_eq!(app.active_ids("acct-a").await, ["s1", "s2"]);
    assert_eq!(app.status("acct-a", "s3").await, "not_found");
}

#[tokio::test]
async fn test_reregistration_is_idempotent_and_refreshes_metadata() {
    let app = TestApp::new();
    let token = token_for("acct-a");

    for ip in ["198.51.100.1", "198.51.100.2"] {
        let response = app
            .request_with_headers(
                "POST",
                "/api/session/register",
                Some(&token),
                Some(json!({ "session_id": "s1", "device_info": "Laptop" })),
                &[("x-forwarded-for", ip)],
            )
            .await;
        assert_eq!(response.body["status"], "success");
    }

    let response = app
        .request("GET", "/api/sessions", Some(&token), None)
        .await;
    let sessions = response.body.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["ip_address"], "198.51.100.2");
    assert_eq!(sessions[0]["status"], "active");
}

#[tokio::test]
async fn test_reregistration_at_the_cap_still_succeeds() {
    let app = TestApp::new();
    app.register("acct-a", "s1").await;
    app.register("acct-a", "s2").await;

    let response = app.register("acct-a", "s2").await;
    assert_eq!(response.body["status"], "success");
    assert_eq!(app.active_ids("acct-a").await, ["s1", "s2"]);
}

#[tokio::test]
async fn test_device_info_derived_from_user_agent() {
    let app = TestApp::new();
    let token = token_for("acct-a");

    app.request_with_headers(
        "POST",
        "/api/session/register",
        Some(&token),
        Some(json!({ "session_id": "s1" })),
        &[("user-agent", CHROME_UA), ("x-forwarded-for", "203.0.113.7, 10.0.0.1")],
    )
    .await;
    app.request_with_headers(
        "POST",
        "/api/session/register",
        Some(&token),
        Some(json!({ "session_id": "s2" })),
        &[("user-agent", "curl/8.5.0")],
    )
    .await;

    let response = app
        .request("GET", "/api/sessions", Some(&token), None)
        .await;
    let sessions = response.body.as_array().unwrap();
    assert_eq!(sessions[0]["device_info"], "Chrome 126.0.0.0 on Windows 10");
    assert_eq!(sessions[0]["ip_address"], "203.0.113.7");
    assert_eq!(sessions[1]["device_info"], "Unknown Device");
    assert_eq!(sessions[1]["ip_address"], "unknown");
}

#[tokio::test]
async fn test_accounts_do_not_share_a_cap() {
    let app = TestApp::new();
    app.register("acct-a", "a1").await;
    app.register("acct-a", "a2").await;

    let response = app.register("acct-b", "b1").await;
    assert_eq!(response.body["status"], "success");
    assert_eq!(app.active_ids("acct-b").await, ["b1"]);
}

#[tokio::test]
async fn test_session_of_another_account_cannot_be_claimed() {
    let app = TestApp::new();
    app.register("acct-a", "shared").await;

    let response = app.register("acct-b", "shared").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.active_ids("acct-a").await, ["shared"]);
    assert!(app.active_ids("acct-b").await.is_empty());
}

#[tokio::test]
async fn test_status_never_leaks_across_accounts() {
    let app = TestApp::new();
    app.register("acct-a", "s1").await;

    assert_eq!(app.status("acct-a", "s1").await, "active");
    assert_eq!(app.status("acct-b", "s1").await, "not_found");
}

#[tokio::test]
async fn test_logout_is_soft_and_frees_a_slot() {
    let app = TestApp::new();
    let token = token_for("acct-a");
    app.register("acct-a", "s1").await;
    app.register("acct-a", "s2").await;

    let response = app
        .request(
            "POST",
            "/api/session/logout",
            Some(&token),
            Some(json!({ "session_id": "s2" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    assert_eq!(app.status("acct-a", "s2").await, "inactive");
    assert_eq!(app.active_ids("acct-a").await, ["s1"]);
    assert_eq!(app.store.len().await, 2);

    let response = app.register("acct-a", "s3").await;
    assert_eq!(response.body["status"], "success");
}

#[tokio::test]
async fn test_logout_of_foreign_session_is_acknowledged_without_change() {
    let app = TestApp::new();
    app.register("acct-a", "s1").await;

    let response = app
        .request(
            "POST",
            "/api/session/logout",
            Some(&token_for("acct-b")),
            Some(json!({ "session_id": "s1" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.status("acct-a", "s1").await, "active");
}

#[tokio::test]
async fn test_per_account_override_raises_the_cap() {
    let mut config = test_config();
    config.session.overrides.insert("vip".to_string(), 3);
    let app = TestApp::with_config(config);

    for sid in ["v1", "v2", "v3"] {
        assert_eq!(app.register("vip", sid).await.body["status"], "success");
    }
    assert_eq!(app.register("vip", "v4").await.body["status"], "limit_reached");
    assert_eq!(app.register("plain", "p1").await.body["status"], "success");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_exceed_the_cap() {
    let app = std::sync::Arc::new(TestApp::new());

    let mut handles = Vec::new();
    for i in 0..12 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.register("acct-a", &format!("tab-{i}")).await.body["status"]
                .as_str()
                .unwrap_or_default()
                .to_string()
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() == "success" {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 2);
    assert_eq!(app.active_ids("acct-a").await.len(), 2);
}
