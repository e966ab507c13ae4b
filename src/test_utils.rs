//! Test utilities shared by the handler and integration tests.

use crate::api::models::users::UserResponse;
use crate::config::Config;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserCreateDBRequest;
use axum::http::{HeaderName, HeaderValue, header::COOKIE};
use axum_test::TestServer;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

/// Build a full application on top of an already-migrated test pool.
///
/// Returns the test server together with the config used to build it, so
/// tests can mint session cookies and inspect paths like the uploads dir.
/// The `TempDir` guard must be kept alive for the test's duration; the
/// uploads directory is removed when it drops.
pub async fn create_test_app(pool: PgPool) -> (TestServer, Config, TempDir) {
    let (config, uploads_dir) = create_test_config();

    let app = crate::Application::new_with_pool(config.clone(), pool).expect("Failed to create application");

    (app.into_test_server(), config, uploads_dir)
}

pub fn create_test_config() -> (Config, TempDir) {
    // Uploads land in a per-test temp dir, cleaned up when the guard drops
    let uploads_dir = tempfile::tempdir().expect("Failed to create temp uploads dir");

    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    config.database.pool.max_connections = 1;
    config.auth.native.session.cookie_secure = false;
    config.uploads.dir = uploads_dir.path().to_path_buf();
    config.uploads.max_file_size = 1024 * 1024; // 1 MB is plenty for tests
    // Unroutable Overpass endpoint so nursery lookups fail fast onto the fallback
    config.nurseries.overpass_url = "http://127.0.0.1:9/api/interpreter".parse().expect("static URL is valid");
    config.nurseries.timeout = std::time::Duration::from_millis(500);
    (config, uploads_dir)
}

/// Create a user directly in the database
pub async fn create_test_user(pool: &PgPool, is_admin: bool) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);

    let user = users
        .create(&UserCreateDBRequest {
            name: "Test User".to_string(),
            email: format!("user_{}@example.com", Uuid::new_v4().simple()),
            password_hash: None,
            profile_pic_url: None,
            is_admin,
        })
        .await
        .expect("Failed to create test user");

    UserResponse::from(user)
}

/// Build a `Cookie` header carrying a valid session token for `user`
pub fn session_header(user: &UserResponse, config: &Config) -> (HeaderName, HeaderValue) {
    let current_user = crate::api::models::users::CurrentUser::from(user.clone());
    let token = crate::auth::session::create_session_token(&current_user, config).expect("Failed to create session token");

    let value = format!("{}={}", config.auth.native.session.cookie_name, token);
    (COOKIE, HeaderValue::from_str(&value).expect("cookie value is valid ASCII"))
}
