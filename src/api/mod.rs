// API layer - HTTP endpoints
pub mod admin;
pub mod auth;
pub mod certificates;
mod dictionaries;
pub mod health;
pub mod keys;
pub mod upload;
pub mod workhours;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use certificates::CertificatesApi;
pub use health::HealthApi;
pub use keys::KeysApi;
pub use upload::UploadApi;
pub use workhours::WorkhoursApi;

use poem_openapi::auth::Bearer;
use poem_openapi::SecurityScheme;
use serde::Serialize;
use serde_json::Value;

use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::types::internal::auth::SessionUser;
use crate::types::internal::permissions::{Module, Permission, Role};

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// Validate the bearer token and re-check the account against the
/// database, so a deactivation or role change cuts access immediately
/// instead of at token expiry.
pub async fn authenticate(app: &AppData, auth: &BearerAuth) -> Result<SessionUser, ApiError> {
    let claims = app.token_service.validate_jwt(&auth.0.token)?;

    let (user, _) = app
        .user_store
        .get(claims.sub)
        .await
        .map_err(|_| ApiError::unauthenticated("Account no longer exists"))?;
    if !user.is_active {
        return Err(ApiError::unauthenticated("Account is deactivated"));
    }

    Ok(SessionUser {
        id: user.id,
        username: user.username.clone(),
        role: Role::parse(&user.role).unwrap_or(Role::User),
    })
}

/// JSON snapshot of a record for an audit before/after value.
pub fn snapshot<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub fn require_admin(user: &SessionUser) -> Result<(), ApiError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::permission_denied())
    }
}

pub async fn require_permission(
    app: &AppData,
    user: &SessionUser,
    module: Module,
    permission: Permission,
) -> Result<(), ApiError> {
    if app
        .permission_service
        .has_permission(user.id, module, permission)
        .await?
    {
        Ok(())
    } else {
        Err(ApiError::permission_denied())
    }
}

pub async fn require_view(
    app: &AppData,
    user: &SessionUser,
    module: Module,
) -> Result<(), ApiError> {
    require_permission(app, user, module, Permission::View).await
}

pub async fn require_write(
    app: &AppData,
    user: &SessionUser,
    module: Module,
) -> Result<(), ApiError> {
    require_permission(app, user, module, Permission::Write).await
}
