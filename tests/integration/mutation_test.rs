//! Integration tests for trash, restore, folder deletion, and moves.

use axum::http::StatusCode;
use vault_database::CatalogStore;
use vault_entity::{Category, FileStatus, Owner};

use crate::helpers::{TestApp, ids};

#[tokio::test]
async fn test_trash_and_restore_move_thumbnail_in_lock_step() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let thumb = app
        .seed_file_with("t.jpg", None, 4, None, Category::System, None)
        .await;
    let file = app
        .seed_file_with("clip.mp4", None, 32, None, Category::Media, Some(thumb.id))
        .await;
    // Give the file a non-default status to check restore fidelity.
    let mut synced = file.clone();
    synced.status = FileStatus::Synced;
    app.store
        .execute_batch(vec![
            vault_database::WriteOp::DeleteFile(file.id),
            vault_database::WriteOp::InsertFile(synced),
        ])
        .await
        .unwrap();

    let response = app
        .request("POST", &format!("/api/files/{}/trash", file.id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    for id in [file.id, thumb.id] {
        let row = app.store.find_file(id).await.unwrap().unwrap();
        assert_eq!(row.status, FileStatus::Deleted);
    }

    let response = app.request("GET", "/api/files?view=trash", None, Some(&cookie)).await;
    assert_eq!(ids(&response.body["data"]), vec![file.id]);

    let response = app
        .request("POST", &format!("/api/files/{}/restore", file.id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let row = app.store.find_file(file.id).await.unwrap().unwrap();
    assert_eq!(row.status, FileStatus::Synced);
    let thumb_row = app.store.find_file(thumb.id).await.unwrap().unwrap();
    assert_eq!(thumb_row.status, FileStatus::Active);
}

#[tokio::test]
async fn test_deleting_nested_folder_removes_everything_below() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let a = app.seed_folder("A", None).await;
    let b = app.seed_folder("B", Some(a.id)).await;
    let x = app.seed_file("X", Some(a.id), 100, None).await;
    let y = app.seed_file("Y", Some(b.id), 10, None).await;
    let keep = app.seed_file("keep", None, 10, None).await;

    let response = app
        .request("DELETE", &format!("/api/folders/{}", a.id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["foldersDeleted"], 2);
    assert_eq!(response.body["data"]["filesDeleted"], 2);

    for id in [x.id, y.id] {
        assert!(!app.row_exists(id).await);
        assert!(!app.blob_exists(id).await);
    }
    assert!(app.store.find_folder(a.id).await.unwrap().is_none());
    assert!(app.store.find_folder(b.id).await.unwrap().is_none());
    assert!(app.row_exists(keep.id).await);

    let response = app
        .request("GET", &format!("/api/entries?parentId={}", a.id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        serde_json::json!({ "folders": [], "files": [] })
    );

    let response = app
        .request("GET", &format!("/api/folders/{}", a.id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_move_rejects_folder_into_descendant() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Wise).await;
    let parent = app.seed_folder("parent", None).await;
    let child = app.seed_folder("child", Some(parent.id)).await;
    let file = app.seed_file("f", None, 8, None).await;

    let body = serde_json::json!({
        "items": [
            { "id": parent.id, "type": "folder" },
            { "id": file.id, "type": "file" },
        ],
        "targetFolderId": child.id,
    });
    let response = app.request("POST", "/api/entries/move", Some(body), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let outcome = &response.body;
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["error"], "PARTIAL_BATCH_FAILURE");
    assert_eq!(outcome["succeeded"], serde_json::json!([file.id]));
    assert_eq!(outcome["failed"][0]["id"], parent.id.to_string());
    assert_eq!(outcome["failed"][0]["error"], "VALIDATION");

    let moved = app.store.find_file(file.id).await.unwrap().unwrap();
    assert_eq!(moved.folder_id, Some(child.id));
    let unmoved = app.store.find_folder(parent.id).await.unwrap().unwrap();
    assert!(unmoved.parent_id.is_none());
}

#[tokio::test]
async fn test_create_rename_and_batch_delete() {
    let app = TestApp::new().await;
    let cookie = app.login(Owner::Belle).await;

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(serde_json::json!({ "name": "  renders  " })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["name"], "renders");
    assert_eq!(response.body["data"]["owner"], "Belle");
    let folder_id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PATCH",
            "/api/entries/rename",
            Some(serde_json::json!({ "id": folder_id, "type": "folder", "name": "final" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let file = app.seed_file("gone", None, 8, None).await;
    let body = serde_json::json!({
        "items": [
            { "id": file.id, "type": "file" },
            { "id": folder_id, "type": "folder" },
        ]
    });
    let response = app.request("POST", "/api/entries/delete", Some(body), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.body["failed"].as_array().unwrap().is_empty());
    assert!(!app.row_exists(file.id).await);
    assert!(!app.blob_exists(file.id).await);

    let response = app.request("GET", "/api/folders", None, Some(&cookie)).await;
    assert!(response.body["data"].as_array().unwrap().is_empty());
}
