// Common test utilities for integration tests

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use poem::test::TestClient;
use poem::Route;
use poem_openapi::auth::Bearer;
use poem_openapi::{OpenApi, OpenApiService};
use sea_orm::Database;

use slotops_backend::api::BearerAuth;
use slotops_backend::app_data::AppData;
use slotops_backend::config::Settings;
use slotops_backend::types::internal::permissions::Role;

/// Builds a fully wired application over an in-memory database with
/// migrations applied.
pub async fn setup_app() -> Arc<AppData> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let settings = Settings {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        upload_dir: "uploads".to_string(),
        admin_initial_password: "admin123".to_string(),
    };
    AppData::init(db, &settings)
}

/// Creates a user and returns a valid bearer token for it.
#[allow(dead_code)]
pub async fn create_user_with_token(app: &AppData, username: &str, role: Role) -> String {
    let user = app
        .user_store
        .create(username, "password123", role)
        .await
        .expect("Failed to create user");
    app.token_service
        .generate_jwt(&user)
        .expect("Failed to generate token")
}

#[allow(dead_code)]
pub fn bearer(token: &str) -> BearerAuth {
    BearerAuth(Bearer {
        token: token.to_string(),
    })
}

/// Mounts one API group behind a test HTTP client, the way main mounts
/// the full service.
#[allow(dead_code)]
pub fn test_client(api: impl OpenApi + 'static) -> TestClient<Route> {
    let service = OpenApiService::new(api, "slotops-backend", "test");
    TestClient::new(Route::new().nest("/", service))
}
