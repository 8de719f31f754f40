//! Test helpers for Web API tests.

use std::sync::Arc;

use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use filevault::file::{FileService, FileStorage};
use filevault::web::handlers::AppState;
use filevault::web::middleware::{JwtClaims, JwtState};
use filevault::web::router::{create_health_router, create_router};
use filevault::Database;

/// Secret shared between the test identity provider and the server.
pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// A running test server plus handles for inspecting state behind it.
pub struct TestContext {
    pub server: TestServer,
    /// Clone of the service behind the server, sharing its pool and storage.
    pub service: FileService,
    _storage_dir: TempDir,
}

/// Create a test server with an in-memory database and temp storage.
pub async fn create_test_server() -> TestContext {
    create_test_server_with_max_size(None).await
}

/// Create a test server with a custom maximum upload size.
pub async fn create_test_server_with_max_size(max_size: Option<u64>) -> TestContext {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let storage_dir = TempDir::new().expect("Failed to create temp storage dir");
    let storage = FileStorage::new(storage_dir.path()).expect("Failed to create file storage");

    let mut service = FileService::new(db, storage);
    if let Some(max_size) = max_size {
        service = service.with_max_file_size(max_size);
    }

    let app_state = Arc::new(AppState::new(service.clone()));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));

    let router = create_router(app_state, jwt_state, &[]).merge(create_health_router());

    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        service,
        _storage_dir: storage_dir,
    }
}

/// Mint a bearer token for the given owner, as the identity provider would.
pub fn bearer_token(owner_id: i64) -> String {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = JwtClaims {
        sub: owner_id,
        iat: now,
        exp: now + 3600,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test token");

    format!("Bearer {token}")
}

/// Mint an already-expired bearer token.
pub fn expired_bearer_token(owner_id: i64) -> String {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = JwtClaims {
        sub: owner_id,
        iat: now - 7200,
        exp: now - 3600,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test token");

    format!("Bearer {token}")
}
