use std::error::Error;

use poem::endpoint::StaticFilesEndpoint;
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};

use migration::{Migrator, MigratorTrait};
use slotops_backend::api::{
    AdminApi, AuthApi, CertificatesApi, HealthApi, KeysApi, UploadApi, WorkhoursApi,
};
use slotops_backend::app_data::AppData;
use slotops_backend::config::logging::init_logging;
use slotops_backend::config::Settings;
use slotops_backend::types::internal::permissions::Role;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    init_logging()?;

    let settings = Settings::from_env()?;

    let db: DatabaseConnection = Database::connect(&settings.database_url).await?;
    tracing::info!(database_url = %settings.database_url, "Connected to database");

    Migrator::up(&db, None).await?;
    tracing::info!("Database migrations completed");

    let app = AppData::init(db, &settings);

    bootstrap_admin(&app, &settings).await?;

    let api_service = OpenApiService::new(
        (
            HealthApi,
            AuthApi::new(app.clone()),
            AdminApi::new(app.clone()),
            KeysApi::new(app.clone()),
            CertificatesApi::new(app.clone()),
            WorkhoursApi::new(app.clone()),
            UploadApi::new(app.clone()),
        ),
        "SlotOps Backend",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("http://{}/api", settings.bind_addr));

    let ui = api_service.swagger_ui();
    let routes = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .nest(
            "/uploads",
            StaticFilesEndpoint::new(&settings.upload_dir),
        );

    tracing::info!(bind_addr = %settings.bind_addr, "Starting server");
    Server::new(TcpListener::bind(&settings.bind_addr))
        .run(routes)
        .await?;

    Ok(())
}

/// Creates the initial admin account when the users table is empty, so a
/// fresh deployment is reachable without manual database edits.
async fn bootstrap_admin(app: &AppData, settings: &Settings) -> Result<(), Box<dyn Error>> {
    if app.user_store.count().await? > 0 {
        return Ok(());
    }

    let admin = app
        .user_store
        .create("admin", &settings.admin_initial_password, Role::Admin)
        .await?;
    tracing::warn!(
        username = %admin.username,
        "Bootstrapped initial admin account, change its password"
    );

    Ok(())
}
