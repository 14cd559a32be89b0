pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_audit_log;
mod m20250301_000003_create_keys_module;
mod m20250301_000004_create_certificates_module;
mod m20250301_000005_create_workhours_module;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_audit_log::Migration),
            Box::new(m20250301_000003_create_keys_module::Migration),
            Box::new(m20250301_000004_create_certificates_module::Migration),
            Box::new(m20250301_000005_create_workhours_module::Migration),
        ]
    }
}
