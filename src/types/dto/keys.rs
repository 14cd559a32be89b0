use poem_openapi::{Enum, Object};

use crate::types::db::key;

/// Which good-count bucket a broken-key report draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "UPPERCASE")]
pub enum KeyColor {
    Silver,
    Gold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "UPPERCASE")]
pub enum LocationStatus {
    Open,
    Closed,
}

impl LocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStatus::Open => "OPEN",
            LocationStatus::Closed => "CLOSED",
        }
    }
}

/// Key inventory row, with its assignment when one exists
#[derive(Object, Debug)]
pub struct KeyDto {
    pub id: i32,
    pub key_code: String,
    pub silver_count: i32,
    pub gold_count: i32,
    pub broken_silver: i32,
    pub broken_gold: i32,
    pub assignment: Option<AssignmentDto>,
}

impl KeyDto {
    pub fn from_parts(model: &key::Model, assignment: Option<AssignmentDto>) -> Self {
        Self {
            id: model.id,
            key_code: model.key_code.clone(),
            silver_count: model.silver_count,
            gold_count: model.gold_count,
            broken_silver: model.broken_silver,
            broken_gold: model.broken_gold,
            assignment,
        }
    }
}

/// Create a key, or add stock to an existing key code
#[derive(Object, Debug)]
pub struct CreateKeyRequest {
    pub key_code: String,
    pub silver_count: Option<i32>,
    pub gold_count: Option<i32>,
    pub broken_silver: Option<i32>,
    pub broken_gold: Option<i32>,
}

/// Move `count` keys of one color from the good to the broken bucket
#[derive(Object, Debug)]
pub struct ReportBrokenRequest {
    pub id: i32,
    pub key_color: KeyColor,
    pub count: i32,
}

/// Assignment with its dictionary names resolved
#[derive(Object, Debug, Clone)]
pub struct AssignmentDto {
    pub id: i32,
    pub key_id: i32,
    pub key_code: String,
    pub location_id: i32,
    pub location_name: String,
    pub location_type_name: Option<String>,
    pub cabinet_position_id: i32,
    pub cabinet_position_name: String,
    pub key_type_id: i32,
    pub key_type_name: String,
}

#[derive(Object, Debug)]
pub struct CreateAssignmentRequest {
    pub key_id: i32,
    pub location_id: i32,
    pub cabinet_position_id: i32,
    pub key_type_id: i32,
}

#[derive(Object, Debug)]
pub struct LocationDto {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub location_type_id: i32,
    pub location_type_name: Option<String>,
}

#[derive(Object, Debug)]
pub struct CreateLocationRequest {
    pub name: String,
    pub location_type_id: i32,
}

#[derive(Object, Debug)]
pub struct UpdateLocationStatusRequest {
    pub id: i32,
    pub status: LocationStatus,
}

/// Generic dictionary row. Extra columns are populated per kind and
/// null for the kinds that do not carry them.
#[derive(Object, Debug)]
pub struct DictionaryItemDto {
    pub id: i32,
    pub name: String,
    pub bios_name: Option<String>,
    pub drawer_type: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
    pub file_path: Option<String>,
    pub is_active: bool,
}

#[derive(Object, Debug)]
pub struct CreateDictionaryItemRequest {
    pub name: String,
    pub bios_name: Option<String>,
    pub drawer_type: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
}

#[derive(Object, Debug)]
pub struct UpdateDictionaryItemRequest {
    pub id: i32,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub bios_name: Option<String>,
    pub drawer_type: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
}

/// Create payload for the plain name-only dictionaries
#[derive(Object, Debug)]
pub struct CreateNamedItemRequest {
    pub name: String,
}

#[derive(Object, Debug)]
pub struct SetActiveRequest {
    pub id: i32,
    pub is_active: bool,
}
