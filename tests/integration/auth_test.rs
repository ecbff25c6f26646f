//! Integration tests for the session boundary.

use axum::http::{StatusCode, header};
use vault_entity::Owner;

use crate::helpers::{TestApp, master_key};

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = TestApp::new().await;
    for path in ["/api/files", "/api/entries", "/api/tags", "/api/stats", "/api/auth/me"] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(response.body["error"], "AUTHENTICATION");
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["database"], "connected");
    assert_eq!(response.body["data"]["storage"], "local");
}

#[tokio::test]
async fn test_login_then_whoami() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Belle).await;

    let response = app.request("GET", "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["owner"], "Belle");
}

#[tokio::test]
async fn test_login_rejections() {
    let app = TestApp::new().await;
    let attempts = [
        serde_json::json!({ "identity": "Belle", "masterKey": master_key(Owner::Wise) }),
        serde_json::json!({ "identity": "Belle", "masterKey": "short" }),
        serde_json::json!({ "identity": "Mallory", "masterKey": master_key(Owner::Belle) }),
    ];
    for body in attempts {
        let response = app.request("POST", "/api/auth/login", Some(body), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.headers.get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_tampered_cookie_is_rejected() {
    let app = TestApp::new().await;
    let forged = "active_identity=Wise:99999999999";
    let response = app.request("GET", "/api/auth/me", None, Some(forged)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let response = app.request("POST", "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let cleared = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cleared.starts_with("active_identity=;"));
}
