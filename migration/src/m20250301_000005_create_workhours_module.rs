use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Technicians::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Technicians::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Technicians::FirstName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Technicians::LastName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Technicians::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InitialHours::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InitialHours::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InitialHours::TechnicianId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(InitialHours::Hours)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_initial_hours_technician_id")
                            .from(InitialHours::Table, InitialHours::TechnicianId)
                            .to(Technicians::Table, Technicians::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkLogs::TechnicianId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkLogs::Date)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkLogs::StartTime)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WorkLogs::EndTime)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WorkLogs::ManualOvertime)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WorkLogs::Notes)
                            .string()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_logs_technician_id")
                            .from(WorkLogs::Table, WorkLogs::TechnicianId)
                            .to(Technicians::Table, Technicians::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_work_logs_technician_date")
                    .table(WorkLogs::Table)
                    .col(WorkLogs::TechnicianId)
                    .col(WorkLogs::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkLogs::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(InitialHours::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Technicians::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Technicians {
    Table,
    Id,
    FirstName,
    LastName,
    IsActive,
}

#[derive(DeriveIden)]
enum InitialHours {
    Table,
    Id,
    TechnicianId,
    Hours,
}

#[derive(DeriveIden)]
enum WorkLogs {
    Table,
    Id,
    TechnicianId,
    Date,
    StartTime,
    EndTime,
    ManualOvertime,
    Notes,
}
