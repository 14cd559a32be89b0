use poem_openapi::Object;

use crate::types::db::{audit_log, user, user_permission};
use crate::types::dto::common::ModulePermissionDto;
use crate::types::internal::permissions::{Module, Role};

/// Full user record for admin screens. Never carries the password hash.
#[derive(Object, Debug)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub permissions: Vec<ModulePermissionDto>,
}

impl UserDto {
    pub fn from_parts(model: &user::Model, permissions: &[user_permission::Model]) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            role: Role::parse(&model.role).unwrap_or(Role::User),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            permissions: permissions
                .iter()
                .filter_map(|p| {
                    let module = match p.module.as_str() {
                        "keys" => Module::Keys,
                        "certificates" => Module::Certificates,
                        "workhours" => Module::Workhours,
                        _ => return None,
                    };
                    Some(ModulePermissionDto {
                        module,
                        can_view: p.can_view,
                        can_write: p.can_write,
                    })
                })
                .collect(),
        }
    }
}

#[derive(Object, Debug)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
    pub permissions: Option<Vec<ModulePermissionDto>>,
}

/// Partial update; absent fields are left unchanged. A present password
/// is re-hashed, a present permissions list replaces the whole matrix.
#[derive(Object, Debug)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub permissions: Option<Vec<ModulePermissionDto>>,
}

/// One audit trail entry
#[derive(Object, Debug)]
pub struct AuditEntryDto {
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

impl From<audit_log::Model> for AuditEntryDto {
    fn from(model: audit_log::Model) -> Self {
        Self {
            id: model.id,
            timestamp: model.timestamp,
            user_id: model.user_id,
            username: model.username,
            action: model.action,
            table_name: model.table_name,
            record_id: model.record_id,
            old_value: model.old_value,
            new_value: model.new_value,
            description: model.description,
        }
    }
}

/// Paginated audit query result
#[derive(Object, Debug)]
pub struct AuditQueryResponse {
    pub entries: Vec<AuditEntryDto>,
    pub total: u64,
}
