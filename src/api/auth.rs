use std::sync::Arc;

use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::{authenticate, BearerAuth};
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::types::dto::auth::{LoginRequest, LoginResponse, UserInfo};
use crate::types::dto::common::ModulePermissionDto;
use crate::types::internal::permissions::{Module, Role};

#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

/// Authentication API endpoints
pub struct AuthApi {
    app: Arc<AppData>,
}

impl AuthApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[OpenApi]
impl AuthApi {
    /// Login with username and password to receive a bearer token
    #[oai(path = "/auth/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
        let user = self
            .app
            .user_store
            .verify_credentials(&body.username, &body.password)
            .await?
            .ok_or_else(ApiError::invalid_credentials)?;

        let token = self.app.token_service.generate_jwt(&user)?;

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(Json(LoginResponse {
            token,
            user: UserInfo::from(&user),
        }))
    }

    /// Identity of the authenticated caller
    #[oai(path = "/auth/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(&self, auth: BearerAuth) -> Result<Json<UserInfo>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        Ok(Json(UserInfo {
            id: user.id,
            username: user.username,
            role: user.role,
        }))
    }

    /// The caller's effective module permission matrix
    #[oai(
        path = "/user/permissions",
        method = "get",
        tag = "AuthTags::Authentication"
    )]
    async fn my_permissions(
        &self,
        auth: BearerAuth,
    ) -> Result<Json<Vec<ModulePermissionDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;

        // Admins have no permission rows; report full access explicitly.
        if user.role == Role::Admin {
            let all = [Module::Keys, Module::Certificates, Module::Workhours]
                .into_iter()
                .map(|module| ModulePermissionDto {
                    module,
                    can_view: true,
                    can_write: true,
                })
                .collect();
            return Ok(Json(all));
        }

        let rows = self
            .app
            .permission_service
            .get_user_permissions(user.id)
            .await?;
        let permissions = rows
            .into_iter()
            .filter_map(|row| {
                let module = match row.module.as_str() {
                    "keys" => Module::Keys,
                    "certificates" => Module::Certificates,
                    "workhours" => Module::Workhours,
                    _ => return None,
                };
                Some(ModulePermissionDto {
                    module,
                    can_view: row.can_view,
                    can_write: row.can_write,
                })
            })
            .collect();
        Ok(Json(permissions))
    }
}
