use crate::errors::DomainError;
use crate::stores::AuditStore;
use crate::types::db::audit_log;
use crate::types::internal::audit::{AuditFilter, AuditRecord};

/// Writes audit entries for completed mutations.
///
/// A failed audit write never fails the request; the mutation has already
/// committed, so the failure is logged and the response goes out.
pub struct AuditLogger {
    store: AuditStore,
}

impl AuditLogger {
    pub fn new(store: AuditStore) -> Self {
        Self { store }
    }

    pub async fn record(&self, record: AuditRecord) {
        let table_name = record.table_name.clone();
        let action = record.action;
        if let Err(e) = self.store.append(record).await {
            tracing::error!(
                table = %table_name,
                action = action.as_str(),
                "Failed to write audit entry: {}",
                e
            );
        }
    }

    pub async fn query(
        &self,
        filter: &AuditFilter,
    ) -> Result<(Vec<audit_log::Model>, u64), DomainError> {
        self.store.query(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::audit::AuditAction;
    use crate::types::internal::auth::SessionUser;
    use crate::types::internal::permissions::Role;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    #[tokio::test]
    async fn record_appends_and_query_reads_back() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let logger = AuditLogger::new(AuditStore::new(db));

        let actor = SessionUser {
            id: 1,
            username: "admin".to_string(),
            role: Role::Admin,
        };
        logger
            .record(AuditRecord::new(
                &actor,
                AuditAction::Create,
                "keys",
                "Created key \"K-01\"",
            ))
            .await;

        let (entries, total) = logger.query(&AuditFilter::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].username, "admin");
    }
}
