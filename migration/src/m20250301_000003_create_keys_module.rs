use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LocationTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LocationTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LocationTypes::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LocationTypes::IsActive)
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
                    .table(CabinetPositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CabinetPositions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CabinetPositions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CabinetPositions::IsActive)
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
                    .table(KeyTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KeyTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KeyTypes::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KeyTypes::IsActive)
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
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Locations::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Locations::LocationTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Locations::Status)
                            .string()
                            .not_null()
                            .default("OPEN"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locations_location_type_id")
                            .from(Locations::Table, Locations::LocationTypeId)
                            .to(LocationTypes::Table, LocationTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Keys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Keys::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Keys::KeyCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Keys::SilverCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Keys::GoldCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Keys::BrokenSilver)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Keys::BrokenGold)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(KeyAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KeyAssignments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KeyAssignments::KeyId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(KeyAssignments::LocationId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KeyAssignments::CabinetPositionId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(KeyAssignments::KeyTypeId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_key_assignments_key_id")
                            .from(KeyAssignments::Table, KeyAssignments::KeyId)
                            .to(Keys::Table, Keys::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_key_assignments_location_id")
                            .from(KeyAssignments::Table, KeyAssignments::LocationId)
                            .to(Locations::Table, Locations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_key_assignments_cabinet_position_id")
                            .from(KeyAssignments::Table, KeyAssignments::CabinetPositionId)
                            .to(CabinetPositions::Table, CabinetPositions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_key_assignments_key_type_id")
                            .from(KeyAssignments::Table, KeyAssignments::KeyTypeId)
                            .to(KeyTypes::Table, KeyTypes::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(KeyAssignments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Keys::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(KeyTypes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CabinetPositions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LocationTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LocationTypes {
    Table,
    Id,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum CabinetPositions {
    Table,
    Id,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum KeyTypes {
    Table,
    Id,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    LocationTypeId,
    Status,
}

#[derive(DeriveIden)]
enum Keys {
    Table,
    Id,
    KeyCode,
    SilverCount,
    GoldCount,
    BrokenSilver,
    BrokenGold,
}

#[derive(DeriveIden)]
enum KeyAssignments {
    Table,
    Id,
    KeyId,
    LocationId,
    CabinetPositionId,
    KeyTypeId,
}
