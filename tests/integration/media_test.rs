//! Integration tests for streaming, downloads, and storage statistics.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use uuid::Uuid;
use vault_entity::Owner;

use crate::helpers::{BLOB_BASE_URL, TestApp, TestResponse};

async fn get_media(app: &TestApp, cookie: &str, id: Uuid, range: Option<&str>) -> TestResponse {
    let mut request = Request::builder()
        .uri(format!("/api/media/{id}"))
        .header(header::COOKIE, cookie);
    if let Some(range) = range {
        request = request.header(header::RANGE, range);
    }
    app.send(request.body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_stream_full_and_ranged() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let file = app.seed_file("clip.mp4", None, 100, None).await;

    let full = get_media(&app, &cookie, file.id, None).await;
    assert_eq!(full.status, StatusCode::OK);
    assert_eq!(full.bytes.len(), 100);
    assert_eq!(full.headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(full.headers[header::CONTENT_TYPE], "video/mp4");

    let partial = get_media(&app, &cookie, file.id, Some("bytes=10-19")).await;
    assert_eq!(partial.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(partial.headers[header::CONTENT_RANGE], "bytes 10-19/100");
    assert_eq!(&partial.bytes[..], &full.bytes[10..20]);

    let tail = get_media(&app, &cookie, file.id, Some("bytes=-5")).await;
    assert_eq!(tail.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(&tail.bytes[..], &full.bytes[95..]);
}

#[tokio::test]
async fn test_unsatisfiable_range() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let file = app.seed_file("clip.mp4", None, 100, None).await;

    let response = get_media(&app, &cookie, file.id, Some("bytes=100-")).await;
    assert_eq!(response.status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers[header::CONTENT_RANGE], "bytes */100");

    let missing = get_media(&app, &cookie, Uuid::now_v7(), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_and_urls() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let file = app.seed_file("clip.mp4", None, 20, None).await;

    let request = Request::builder()
        .uri(format!("/api/download/{}", file.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"clip.mp4\""
    );
    assert_eq!(response.bytes.len(), 20);

    let response = app
        .request("GET", &format!("/api/files/{}/url", file.id), None, Some(&cookie))
        .await;
    assert_eq!(response.body["data"]["url"], format!("{BLOB_BASE_URL}/{}", file.id));

    let response = app
        .request("GET", &format!("/api/files/{}/url?download=true", file.id), None, Some(&cookie))
        .await;
    assert_eq!(
        response.body["data"]["url"],
        format!("{BLOB_BASE_URL}/{}?download=1", file.id)
    );
}

#[tokio::test]
async fn test_storage_stats() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    app.seed_file("a", None, 100, None).await;
    let trashed = app.seed_file("b", None, 50, None).await;
    app.request("POST", &format!("/api/files/{}/trash", trashed.id), None, Some(&cookie))
        .await;

    let response = app.request("GET", "/api/stats", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        serde_json::json!({ "usedBytes": 150, "capacityBytes": 10_000, "fileCount": 2 })
    );
}
