use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Append-only audit trail. Rows are inserted after successful mutations
/// and never updated or deleted by the application.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub timestamp: String,
    pub user_id: Option<i32>,
    pub username: String,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<i32>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
