use poem_openapi::Object;

use crate::types::db::user;
use crate::types::internal::permissions::Role;

/// Login request payload
#[derive(Object, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Object, Debug)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: UserInfo,
}

/// Public identity of an authenticated user
#[derive(Object, Debug)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl From<&user::Model> for UserInfo {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            // The application only ever writes known role strings
            role: Role::parse(&model.role).unwrap_or(Role::User),
        }
    }
}
