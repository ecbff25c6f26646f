//! Integration tests for listings, pagination, tag views, and navigation.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use uuid::Uuid;
use vault_entity::Owner;

use crate::helpers::{TestApp, ids};

/// Files in the order listings must show them: newest first, id breaking ties.
fn expected_order(mut files: Vec<(chrono::DateTime<Utc>, Uuid)>) -> Vec<Uuid> {
    files.sort_by(|a, b| b.cmp(a));
    files.into_iter().map(|(_, id)| id).collect()
}

#[tokio::test]
async fn test_paged_listing_is_exhaustive_with_timestamp_ties() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;

    let base = vault_entity::timestamp_now() - Duration::minutes(10);
    let mut seeded = Vec::new();
    for i in 0..11 {
        // Groups of three share a timestamp.
        let at = base + Duration::seconds(i / 3);
        let file = app.seed_file(&format!("f{i}"), None, 8, Some(at)).await;
        seeded.push((file.created_at, file.id));
    }
    let expected = expected_order(seeded);

    let mut collected = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let path = match &cursor {
            Some(c) => format!("/api/files/paged?limit=3&cursor={c}"),
            None => "/api/files/paged?limit=3".to_string(),
        };
        let response = app.request("GET", &path, None, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        let page = &response.body["data"];
        let items = ids(&page["items"]);
        assert!(items.len() <= 3);
        collected.extend(items);
        match page["nextCursor"].as_str() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    assert_eq!(collected, expected);
}

#[tokio::test]
async fn test_invalid_cursor_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let response = app
        .request("GET", "/api/files/paged?cursor=not-a-cursor", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_tag_view_follows_untagging() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let now = Utc::now();
    let x = app.seed_file("x", None, 8, Some(now - Duration::seconds(5))).await;
    let y = app.seed_file("y", None, 8, Some(now - Duration::seconds(1))).await;
    app.seed_file("z", None, 8, None).await;

    let mut tag_id = String::new();
    for file in [&x, &y] {
        let response = app
            .request(
                "POST",
                &format!("/api/files/{}/tags", file.id),
                Some(serde_json::json!({ "tagName": "proxy" })),
                Some(&cookie),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        tag_id = response.body["data"]["id"].as_str().unwrap().to_string();
    }

    let path = format!("/api/files?view=tag&tagId={tag_id}");
    let response = app.request("GET", &path, None, Some(&cookie)).await;
    assert_eq!(ids(&response.body["data"]), vec![y.id, x.id]);

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/{}/tags/{tag_id}", x.id),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &path, None, Some(&cookie)).await;
    assert_eq!(ids(&response.body["data"]), vec![y.id]);
}

#[tokio::test]
async fn test_trash_view_composes_with_tag_filter() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let folder = app.seed_folder("shoot", None).await;
    let now = Utc::now();
    let x = app
        .seed_file("x", Some(folder.id), 8, Some(now - Duration::seconds(5)))
        .await;
    let y = app.seed_file("y", Some(folder.id), 8, None).await;

    let mut tag_id = String::new();
    for file in [&x, &y] {
        let response = app
            .request(
                "POST",
                &format!("/api/files/{}/tags", file.id),
                Some(serde_json::json!({ "tagName": "b-roll" })),
                Some(&cookie),
            )
            .await;
        tag_id = response.body["data"]["id"].as_str().unwrap().to_string();
    }
    let response = app
        .request("POST", &format!("/api/files/{}/trash", x.id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/files?view=trash&tagId={tag_id}"), None, Some(&cookie))
        .await;
    assert_eq!(ids(&response.body["data"]), vec![x.id]);
    let response = app
        .request("GET", &format!("/api/files?view=active&tagId={tag_id}"), None, Some(&cookie))
        .await;
    assert_eq!(ids(&response.body["data"]), vec![y.id]);

    let path = format!(
        "/api/files/paged?view=trash&tagId={tag_id}&parentId={}&limit=5",
        folder.id
    );
    let response = app.request("GET", &path, None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(ids(&response.body["data"]["items"]), vec![x.id]);
    assert!(response.body["data"]["nextCursor"].is_null());
}

#[tokio::test]
async fn test_attaching_same_tag_twice_links_once() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let file = app.seed_file("x", None, 8, None).await;

    for _ in 0..2 {
        let response = app
            .request(
                "POST",
                &format!("/api/files/{}/tags", file.id),
                Some(serde_json::json!({ "tagName": "raw" })),
                Some(&cookie),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    assert_eq!(app.store.link_count().await, 1);

    let response = app.request("GET", "/api/tags", None, Some(&cookie)).await;
    let tags = response.body["data"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["usageCount"], 1);

    // Detaching a tag that was never attached succeeds.
    let response = app
        .request(
            "DELETE",
            &format!("/api/files/{}/tags/{}", file.id, Uuid::now_v7()),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.link_count().await, 1);
}

#[tokio::test]
async fn test_entries_and_sibling_navigation() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let folder = app.seed_folder("clips", None).await;
    let now = Utc::now();
    let a = app.seed_file("a", Some(folder.id), 8, Some(now - Duration::seconds(3))).await;
    let b = app.seed_file("b", Some(folder.id), 8, Some(now - Duration::seconds(2))).await;
    let c = app.seed_file("c", Some(folder.id), 8, Some(now - Duration::seconds(1))).await;
    app.seed_file("elsewhere", None, 8, None).await;

    let response = app.request("GET", "/api/entries", None, Some(&cookie)).await;
    let root = &response.body["data"];
    assert_eq!(root["folders"][0]["id"], folder.id.to_string());
    assert_eq!(root["files"].as_array().unwrap().len(), 1);

    let response = app
        .request("GET", &format!("/api/entries?parentId={}", folder.id), None, Some(&cookie))
        .await;
    assert_eq!(ids(&response.body["data"]["files"]), vec![c.id, b.id, a.id]);

    let response = app
        .request("GET", &format!("/api/files/{}/nav", b.id), None, Some(&cookie))
        .await;
    assert_eq!(response.body["data"]["prevId"], c.id.to_string());
    assert_eq!(response.body["data"]["nextId"], a.id.to_string());

    let response = app
        .request("GET", &format!("/api/files/{}/nav", c.id), None, Some(&cookie))
        .await;
    assert!(response.body["data"]["prevId"].is_null());

    let response = app
        .request("GET", &format!("/api/files/{}/nav", Uuid::now_v7()), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["nextId"].is_null());
}
