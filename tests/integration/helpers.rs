//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use vault_core::config::app::ServerConfig;
use vault_core::config::auth::{AuthConfig, IdentityConfig};
use vault_core::config::catalog::CatalogConfig;
use vault_core::config::logging::LoggingConfig;
use vault_core::config::storage::StorageConfig;
use vault_core::config::{AppConfig, DatabaseConfig};
use vault_core::traits::storage::ObjectStore;
use vault_database::{CatalogStore, MemoryCatalogStore, WriteOp};
use vault_entity::file::NewFile;
use vault_entity::{Category, File, Folder, Owner};
use vault_storage::LocalObjectStore;

pub const BLOB_BASE_URL: &str = "http://vault.test/api/blobs";

/// Master key every test identity signs in with.
pub fn master_key(owner: Owner) -> String {
    format!("{}-{}", owner.as_str().to_lowercase(), "k".repeat(64))
}

fn test_config(blob_root: &str) -> AppConfig {
    let mut storage = StorageConfig::default();
    storage.local.root_path = blob_root.to_string();
    storage.local.public_base_url = BLOB_BASE_URL.to_string();
    storage.capacity_bytes = 10_000;

    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        storage,
        auth: AuthConfig {
            identities: Owner::ALL
                .iter()
                .map(|owner| IdentityConfig {
                    owner: owner.to_string(),
                    master_key: master_key(*owner),
                })
                .collect(),
            min_key_length: 62,
            cookie_name: "active_identity".to_string(),
            session_ttl_seconds: 3600,
            cookie_secure: false,
            cookie_secret: "c".repeat(64),
        },
        catalog: CatalogConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// Test application context
pub struct TestApp {
    _dir: TempDir,
    /// The Axum router for making test requests
    pub router: Router,
    /// Catalog store for seeding and direct assertions
    pub store: Arc<MemoryCatalogStore>,
    /// Object store the router writes to
    pub objects: Arc<LocalObjectStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
}

impl TestApp {
    /// Create a new test application backed by memory and a temp directory.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().to_str().expect("Temp path is not UTF-8").to_string();
        let config = test_config(&root);

        let store = Arc::new(MemoryCatalogStore::new());
        let objects = Arc::new(
            LocalObjectStore::new(&root, BLOB_BASE_URL)
                .await
                .expect("Failed to init object store"),
        );
        let state = vault_api::build_state(config, store.clone(), objects.clone())
            .expect("Failed to build state");

        Self {
            _dir: dir,
            router: vault_api::build_app(state),
            store,
            objects,
        }
    }

    /// Log in and return the `Cookie` header value for the session.
    pub async fn login(&self, owner: Owner) -> String {
        let body = serde_json::json!({
            "identity": owner.as_str(),
            "masterKey": master_key(owner),
        });
        let response = self.request("POST", "/api/auth/login", Some(body), None).await;
        assert_eq!(response.status, StatusCode::OK, "Login failed: {:?}", response.body);
        let set_cookie = response
            .headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("No session cookie in login response");
        set_cookie
            .split(';')
            .next()
            .expect("Empty Set-Cookie header")
            .to_string()
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Insert a folder row directly.
    pub async fn seed_folder(&self, name: &str, parent_id: Option<Uuid>) -> Folder {
        let folder = Folder::new(name, Owner::Wise, parent_id);
        self.store
            .execute_batch(vec![WriteOp::InsertFolder(folder.clone())])
            .await
            .expect("Failed to seed folder");
        folder
    }

    /// Store a blob of `size` bytes and insert its file row directly.
    pub async fn seed_file(
        &self,
        name: &str,
        folder_id: Option<Uuid>,
        size: usize,
        created_at: Option<DateTime<Utc>>,
    ) -> File {
        self.seed_file_with(name, folder_id, size, created_at, Category::Media, None)
            .await
    }

    pub async fn seed_file_with(
        &self,
        name: &str,
        folder_id: Option<Uuid>,
        size: usize,
        created_at: Option<DateTime<Utc>>,
        category: Category,
        thumbnail_id: Option<Uuid>,
    ) -> File {
        let mut file = NewFile {
            id: Uuid::now_v7(),
            name: name.to_string(),
            folder_id,
            category,
            mime_type: "video/mp4".to_string(),
            size_bytes: size as i64,
            owner: Owner::Wise,
            original_name: None,
            thumbnail_id,
        }
        .into_file();
        if let Some(at) = created_at {
            file.created_at = at;
            file.updated_at = at;
        }
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        self.objects
            .put(&file.id.to_string(), Bytes::from(data), &file.mime_type)
            .await
            .expect("Failed to seed blob");
        self.store
            .execute_batch(vec![WriteOp::InsertFile(file.clone())])
            .await
            .expect("Failed to seed file");
        file
    }

    pub async fn blob_exists(&self, id: Uuid) -> bool {
        self.objects
            .head(&id.to_string())
            .await
            .expect("Head failed")
            .is_some()
    }

    pub async fn row_exists(&self, id: Uuid) -> bool {
        self.store.find_file(id).await.expect("Lookup failed").is_some()
    }
}

/// Ids of the files in a `data` array, in order.
pub fn ids(data: &Value) -> Vec<Uuid> {
    data.as_array()
        .expect("Expected an array")
        .iter()
        .map(|item| {
            item["id"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .expect("Item without an id")
        })
        .collect()
}
