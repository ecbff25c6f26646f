//! Integration tests for the upload pipeline.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use uuid::Uuid;
use vault_entity::Owner;

use crate::helpers::{BLOB_BASE_URL, TestApp, TestResponse};

const BOUNDARY: &str = "vault-test-boundary";

/// Presign, then push `size` bytes to the returned URL.
async fn presign_and_put(app: &TestApp, cookie: &str, name: &str, size: usize) -> Uuid {
    let response = app
        .request(
            "POST",
            "/api/uploads/presign",
            Some(serde_json::json!({ "fileName": name, "fileType": "video/mp4" })),
            Some(cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let id: Uuid = response.body["data"]["id"].as_str().unwrap().parse().unwrap();
    let url = response.body["data"]["uploadUrl"].as_str().unwrap();
    let path = format!("/api/blobs{}", url.strip_prefix(BLOB_BASE_URL).unwrap());

    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::COOKIE, cookie)
        .body(Body::from(vec![1u8; size]))
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::OK);
    id
}

async fn multipart_upload(app: &TestApp, cookie: &str, fields: &[(&str, &str)], data: &[u8]) -> TestResponse {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip.mp4\"\r\nContent-Type: video/mp4\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn test_batch_registration_excludes_only_the_corrupted_record() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Phaethon).await;

    let mut records = Vec::new();
    let mut ids = Vec::new();
    for i in 0..6 {
        let id = presign_and_put(&app, &cookie, &format!("part{i}.mp4"), 40).await;
        // The fourth record lies about its size.
        let declared = if i == 3 { 41 } else { 40 };
        records.push(serde_json::json!({
            "fileId": id,
            "fileName": format!("part{i}.mp4"),
            "fileType": "video/mp4",
            "fileSize": declared,
            "category": "MEDIA",
            "tags": ["batch"],
        }));
        ids.push(id);
    }
    let corrupted = ids[3];

    let response = app
        .request(
            "POST",
            "/api/uploads/register-batch",
            Some(serde_json::json!({ "files": records })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["succeeded"].as_array().unwrap().len(), 5);
    assert_eq!(response.body["failed"][0]["id"], corrupted.to_string());
    assert_eq!(response.body["failed"][0]["error"], "INTEGRITY_MISMATCH");

    assert!(!app.row_exists(corrupted).await);
    assert!(!app.blob_exists(corrupted).await);
    for id in ids.iter().filter(|id| **id != corrupted) {
        assert!(app.row_exists(*id).await);
    }
    assert_eq!(app.store.link_count().await, 5);

    let response = app.request("GET", "/api/files", None, Some(&cookie)).await;
    let listed = response.body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 5);
    assert!(listed.iter().all(|f| f["owner"] == "Phaethon"));
}

#[tokio::test]
async fn test_register_single_upload() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let id = presign_and_put(&app, &cookie, "take.mp4", 12).await;

    let response = app
        .request(
            "POST",
            "/api/uploads/register",
            Some(serde_json::json!({
                "fileId": id,
                "fileName": "take.mp4",
                "fileSize": 12,
                "originalName": "TAKE_001.MP4",
            })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["sizeBytes"], 12);
    assert_eq!(response.body["data"]["originalName"], "TAKE_001.MP4");
}

#[tokio::test]
async fn test_reregistering_a_catalogued_id_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let live = app.seed_file("live.mp4", None, 16, None).await;

    let record = serde_json::json!({ "fileId": live.id, "fileName": "live.mp4", "fileSize": 999 });
    let response = app
        .request("POST", "/api/uploads/register", Some(record.clone()), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request(
            "POST",
            "/api/uploads/register-batch",
            Some(serde_json::json!({ "files": [record] })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["failed"][0]["error"], "CONFLICT");

    assert!(app.blob_exists(live.id).await);
    assert!(app.row_exists(live.id).await);
}

#[tokio::test]
async fn test_direct_upload_registers_file() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Belle).await;
    let response = multipart_upload(&app, &cookie, &[("category", "MEDIA")], b"0123456789").await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let data = &response.body["data"];
    assert_eq!(data["name"], "clip.mp4");
    assert_eq!(data["sizeBytes"], 10);
    assert_eq!(data["owner"], "Belle");
    let id: Uuid = data["id"].as_str().unwrap().parse().unwrap();
    assert!(app.blob_exists(id).await);
}

#[tokio::test]
async fn test_direct_upload_with_wrong_size_is_rolled_back() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Belle).await;
    let response = multipart_upload(&app, &cookie, &[("size", "11")], b"0123456789").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "INTEGRITY_MISMATCH");

    let response = app.request("GET", "/api/files", None, Some(&cookie)).await;
    assert!(response.body["data"].as_array().unwrap().is_empty());
    let response = app.request("GET", "/api/stats", None, Some(&cookie)).await;
    assert_eq!(response.body["data"]["fileCount"], 0);
}

#[tokio::test]
async fn test_direct_upload_into_missing_folder() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Belle).await;
    let folder = Uuid::now_v7().to_string();
    let response = multipart_upload(&app, &cookie, &[("folderId", folder.as_str())], b"abc").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
