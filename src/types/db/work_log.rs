use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A single day entry. Either a timed entry (start_time and end_time set)
/// or a manual overtime entry (manual_overtime set), never both.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "work_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub technician_id: i32,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub manual_overtime: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
