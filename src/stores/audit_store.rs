use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::errors::DomainError;
use crate::types::db::audit_log;
use crate::types::internal::audit::{AuditFilter, AuditRecord};

const DEFAULT_PAGE_SIZE: u64 = 100;

/// Repository for the append-only audit trail
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append one entry. The timestamp is taken here, not from the caller.
    pub async fn append(&self, record: AuditRecord) -> Result<audit_log::Model, DomainError> {
        let entry = audit_log::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(Utc::now().to_rfc3339()),
            user_id: Set(record.user_id),
            username: Set(record.username),
            action: Set(record.action.as_str().to_string()),
            table_name: Set(record.table_name),
            record_id: Set(record.record_id),
            old_value: Set(record.old_value.map(|v| v.to_string())),
            new_value: Set(record.new_value.map(|v| v.to_string())),
            description: Set(record.description),
        };

        entry
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::database("append_audit_entry", e))
    }

    /// Query entries newest-first with the total count before pagination.
    pub async fn query(
        &self,
        filter: &AuditFilter,
    ) -> Result<(Vec<audit_log::Model>, u64), DomainError> {
        let mut select = audit_log::Entity::find();

        if let Some(table) = &filter.table_name {
            select = select.filter(audit_log::Column::TableName.eq(table));
        }
        if let Some(action) = filter.action {
            select = select.filter(audit_log::Column::Action.eq(action.as_str()));
        }
        if let Some(user_id) = filter.user_id {
            select = select.filter(audit_log::Column::UserId.eq(user_id));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::database("count_audit_entries", e))?;

        let entries = select
            .order_by_desc(audit_log::Column::Id)
            .offset(filter.offset.unwrap_or(0))
            .limit(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("query_audit_entries", e))?;

        Ok((entries, total))
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

    async fn setup() -> AuditStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        AuditStore::new(db)
    }

    fn actor() -> SessionUser {
        SessionUser {
            id: 1,
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn append_persists_entry_with_timestamp() {
        let store = setup().await;

        let entry = store
            .append(
                AuditRecord::new(&actor(), AuditAction::Create, "keys", "Created key \"K-01\"")
                    .record_id(7)
                    .new_value(serde_json::json!({ "keyCode": "K-01" })),
            )
            .await
            .unwrap();

        assert_eq!(entry.action, "CREATE");
        assert_eq!(entry.table_name, "keys");
        assert_eq!(entry.record_id, Some(7));
        assert!(entry.old_value.is_none());
        assert!(entry.new_value.unwrap().contains("K-01"));
        assert!(!entry.timestamp.is_empty());
    }

    #[tokio::test]
    async fn query_filters_by_table_and_action() {
        let store = setup().await;
        let user = actor();

        store
            .append(AuditRecord::new(&user, AuditAction::Create, "keys", "a"))
            .await
            .unwrap();
        store
            .append(AuditRecord::new(&user, AuditAction::Delete, "keys", "b"))
            .await
            .unwrap();
        store
            .append(AuditRecord::new(&user, AuditAction::Create, "locations", "c"))
            .await
            .unwrap();

        let (entries, total) = store
            .query(&AuditFilter {
                table_name: Some("keys".to_string()),
                action: Some(AuditAction::Create),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "a");
    }

    #[tokio::test]
    async fn query_returns_newest_first_with_pagination() {
        let store = setup().await;
        let user = actor();

        for i in 0..5 {
            store
                .append(AuditRecord::new(
                    &user,
                    AuditAction::Update,
                    "keys",
                    format!("entry-{}", i),
                ))
                .await
                .unwrap();
        }

        let (page, total) = store
            .query(&AuditFilter {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].description, "entry-3");
        assert_eq!(page[1].description, "entry-2");
    }
}
