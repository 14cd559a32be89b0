use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Regulatory certificate. Game and board are fixed at creation time;
/// the cabinet set lives in `certificate_cabinets`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "certificate_definitions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub recognized_hr: bool,
    pub for_slovenia: bool,
    pub file_path: Option<String>,
    pub game_id: i32,
    pub board_id: i32,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
