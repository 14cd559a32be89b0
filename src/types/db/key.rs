use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Physical key inventory. Counts are kept per color with separate
/// good and broken buckets.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub key_code: String,
    pub silver_count: i32,
    pub gold_count: i32,
    pub broken_silver: i32,
    pub broken_gold: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
