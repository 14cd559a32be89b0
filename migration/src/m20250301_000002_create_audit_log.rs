use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::Timestamp)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::UserId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::Username)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::Action)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::TableName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::RecordId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::OldValue)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::NewValue)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::Description)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_log_table_name")
                    .table(AuditLog::Table)
                    .col(AuditLog::TableName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_log_timestamp")
                    .table(AuditLog::Table)
                    .col(AuditLog::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuditLog {
    Table,
    Id,
    Timestamp,
    UserId,
    Username,
    Action,
    TableName,
    RecordId,
    OldValue,
    NewValue,
    Description,
}
