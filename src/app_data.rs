use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::services::{AuditLogger, PermissionService, TokenService};
use crate::stores::{
    AuditStore, CertificateStore, DictionaryStore, KeyStore, UserStore, WorkhoursStore,
};

/// Centralized application state, created once in main and shared by
/// every API group.
pub struct AppData {
    pub db: DatabaseConnection,
    pub upload_dir: String,
    pub token_service: TokenService,
    pub permission_service: PermissionService,
    pub audit_logger: AuditLogger,
    pub user_store: UserStore,
    pub key_store: KeyStore,
    pub dictionary_store: DictionaryStore,
    pub certificate_store: CertificateStore,
    pub workhours_store: WorkhoursStore,
}

impl AppData {
    /// Wire up all services and stores over an already-migrated connection.
    pub fn init(db: DatabaseConnection, settings: &Settings) -> Arc<Self> {
        tracing::debug!("Creating stores and services");

        Arc::new(Self {
            db: db.clone(),
            upload_dir: settings.upload_dir.clone(),
            token_service: TokenService::new(settings.jwt_secret.clone()),
            permission_service: PermissionService::new(db.clone()),
            audit_logger: AuditLogger::new(AuditStore::new(db.clone())),
            user_store: UserStore::new(db.clone()),
            key_store: KeyStore::new(db.clone()),
            dictionary_store: DictionaryStore::new(db.clone()),
            certificate_store: CertificateStore::new(db.clone()),
            workhours_store: WorkhoursStore::new(db),
        })
    }
}
