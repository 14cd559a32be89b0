use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BoardDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoardDefinitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BoardDefinitions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BoardDefinitions::BiosName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BoardDefinitions::IsActive)
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
                    .table(CabinetDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CabinetDefinitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CabinetDefinitions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CabinetDefinitions::DrawerType)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CabinetDefinitions::IsActive)
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
                    .table(GameDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameDefinitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GameDefinitions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GameDefinitions::Version)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GameDefinitions::RenoId)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GameDefinitions::IsActive)
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
                    .table(ControllerDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ControllerDefinitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ControllerDefinitions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ControllerDefinitions::Version)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ControllerDefinitions::IsActive)
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
                    .table(CertificateDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CertificateDefinitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::RecognizedHr)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::ForSlovenia)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::FilePath)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::GameId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::BoardId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificateDefinitions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificate_definitions_game_id")
                            .from(CertificateDefinitions::Table, CertificateDefinitions::GameId)
                            .to(GameDefinitions::Table, GameDefinitions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificate_definitions_board_id")
                            .from(CertificateDefinitions::Table, CertificateDefinitions::BoardId)
                            .to(BoardDefinitions::Table, BoardDefinitions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CertificateCabinets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CertificateCabinets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CertificateCabinets::CertificateId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificateCabinets::CabinetId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificate_cabinets_certificate_id")
                            .from(CertificateCabinets::Table, CertificateCabinets::CertificateId)
                            .to(CertificateDefinitions::Table, CertificateDefinitions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificate_cabinets_cabinet_id")
                            .from(CertificateCabinets::Table, CertificateCabinets::CabinetId)
                            .to(CabinetDefinitions::Table, CabinetDefinitions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_certificate_cabinets_cert_cabinet")
                    .table(CertificateCabinets::Table)
                    .col(CertificateCabinets::CertificateId)
                    .col(CertificateCabinets::CabinetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JackpotConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JackpotConfigs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::GameId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::ControllerId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::InitialGrand)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::InitialMajor)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::MinBet)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::MaxBet)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JackpotConfigs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jackpot_configs_game_id")
                            .from(JackpotConfigs::Table, JackpotConfigs::GameId)
                            .to(GameDefinitions::Table, GameDefinitions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jackpot_configs_controller_id")
                            .from(JackpotConfigs::Table, JackpotConfigs::ControllerId)
                            .to(ControllerDefinitions::Table, ControllerDefinitions::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JackpotConfigs::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CertificateCabinets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CertificateDefinitions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ControllerDefinitions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GameDefinitions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CabinetDefinitions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BoardDefinitions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BoardDefinitions {
    Table,
    Id,
    Name,
    BiosName,
    IsActive,
}

#[derive(DeriveIden)]
enum CabinetDefinitions {
    Table,
    Id,
    Name,
    DrawerType,
    IsActive,
}

#[derive(DeriveIden)]
enum GameDefinitions {
    Table,
    Id,
    Name,
    Version,
    RenoId,
    IsActive,
}

#[derive(DeriveIden)]
enum ControllerDefinitions {
    Table,
    Id,
    Name,
    Version,
    IsActive,
}

#[derive(DeriveIden)]
enum CertificateDefinitions {
    Table,
    Id,
    Name,
    RecognizedHr,
    ForSlovenia,
    FilePath,
    GameId,
    BoardId,
    IsActive,
}

#[derive(DeriveIden)]
enum CertificateCabinets {
    Table,
    Id,
    CertificateId,
    CabinetId,
}

#[derive(DeriveIden)]
enum JackpotConfigs {
    Table,
    Id,
    GameId,
    ControllerId,
    InitialGrand,
    InitialMajor,
    MinBet,
    MaxBet,
    IsActive,
}
