use std::sync::Arc;

use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::{authenticate, require_admin, snapshot, BearerAuth};
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::stores::user_store::UserChanges;
use crate::types::dto::admin::{
    AuditQueryResponse, CreateUserRequest, UpdateUserRequest, UserDto,
};
use crate::types::dto::common::MessageResponse;
use crate::types::internal::audit::{AuditAction, AuditFilter, AuditRecord};
use crate::types::internal::permissions::Role;

#[derive(Tags)]
enum AdminTags {
    /// User administration
    Users,
    /// Audit trail
    Audit,
}

/// Admin-only API: user accounts, permissions and the audit trail
pub struct AdminApi {
    app: Arc<AppData>,
}

impl AdminApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    /// List all users with their permission matrices
    #[oai(path = "/users", method = "get", tag = "AdminTags::Users")]
    async fn list_users(&self, auth: BearerAuth) -> Result<Json<Vec<UserDto>>, ApiError> {
        let actor = authenticate(&self.app, &auth).await?;
        require_admin(&actor)?;

        let users = self.app.user_store.list().await?;
        Ok(Json(
            users
                .iter()
                .map(|(user, permissions)| UserDto::from_parts(user, permissions))
                .collect(),
        ))
    }

    /// Fetch a single user with their permission matrix
    #[oai(path = "/users/:id", method = "get", tag = "AdminTags::Users")]
    async fn get_user(&self, auth: BearerAuth, id: Path<i32>) -> Result<Json<UserDto>, ApiError> {
        let actor = authenticate(&self.app, &auth).await?;
        require_admin(&actor)?;

        let (user, permissions) = self.app.user_store.get(id.0).await?;
        Ok(Json(UserDto::from_parts(&user, &permissions)))
    }

    /// Create a user, with an optional initial permission matrix
    #[oai(path = "/users", method = "post", tag = "AdminTags::Users")]
    async fn create_user(
        &self,
        auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<UserDto>, ApiError> {
        let actor = authenticate(&self.app, &auth).await?;
        require_admin(&actor)?;

        let role = body.role.unwrap_or(Role::User);
        let created = self
            .app
            .user_store
            .create(&body.username, &body.password, role)
            .await?;

        if let Some(permissions) = &body.permissions {
            self.app
                .permission_service
                .set_user_permissions(created.id, permissions)
                .await?;
        }

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &actor,
                    AuditAction::Create,
                    "users",
                    format!("Created user \"{}\"", created.username),
                )
                .record_id(created.id)
                .new_value(snapshot(&created)),
            )
            .await;

        let (user, permissions) = self.app.user_store.get(created.id).await?;
        Ok(Json(UserDto::from_parts(&user, &permissions)))
    }

    /// Update a user. A present permissions list replaces the matrix.
    #[oai(path = "/users/:id", method = "put", tag = "AdminTags::Users")]
    async fn update_user(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserDto>, ApiError> {
        let actor = authenticate(&self.app, &auth).await?;
        require_admin(&actor)?;

        let (old, updated) = self
            .app
            .user_store
            .update(
                id.0,
                UserChanges {
                    username: body.username.clone(),
                    password: body.password.clone(),
                    role: body.role,
                    is_active: body.is_active,
                },
            )
            .await?;

        if let Some(permissions) = &body.permissions {
            self.app
                .permission_service
                .set_user_permissions(updated.id, permissions)
                .await?;
        }

        let (action, description) = match (old.is_active, updated.is_active) {
            (true, false) => (
                AuditAction::Block,
                format!("Deactivated user \"{}\"", updated.username),
            ),
            (false, true) => (
                AuditAction::Unblock,
                format!("Reactivated user \"{}\"", updated.username),
            ),
            _ => (
                AuditAction::Update,
                format!("Updated user \"{}\"", updated.username),
            ),
        };
        self.app
            .audit_logger
            .record(
                AuditRecord::new(&actor, action, "users", description)
                    .record_id(updated.id)
                    .old_value(snapshot(&old))
                    .new_value(snapshot(&updated)),
            )
            .await;

        let (user, permissions) = self.app.user_store.get(updated.id).await?;
        Ok(Json(UserDto::from_parts(&user, &permissions)))
    }

    /// Delete a user. Self-deletion is rejected.
    #[oai(path = "/users/:id", method = "delete", tag = "AdminTags::Users")]
    async fn delete_user(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let actor = authenticate(&self.app, &auth).await?;
        require_admin(&actor)?;

        let deleted = self.app.user_store.delete(actor.id, id.0).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &actor,
                    AuditAction::Delete,
                    "users",
                    format!("Deleted user \"{}\"", deleted.username),
                )
                .record_id(deleted.id)
                .old_value(snapshot(&deleted)),
            )
            .await;

        Ok(Json(MessageResponse::new("User deleted")))
    }

    /// Query the audit trail, newest first
    #[oai(path = "/audit", method = "get", tag = "AdminTags::Audit")]
    async fn query_audit(
        &self,
        auth: BearerAuth,
        #[oai(name = "table")] table_name: Query<Option<String>>,
        action: Query<Option<String>>,
        user_id: Query<Option<i32>>,
        limit: Query<Option<u64>>,
        offset: Query<Option<u64>>,
    ) -> Result<Json<AuditQueryResponse>, ApiError> {
        let actor = authenticate(&self.app, &auth).await?;
        require_admin(&actor)?;

        let action = match &action.0 {
            Some(value) => Some(
                AuditAction::parse(value)
                    .ok_or_else(|| ApiError::validation("Unknown audit action"))?,
            ),
            None => None,
        };

        let (entries, total) = self
            .app
            .audit_logger
            .query(&AuditFilter {
                table_name: table_name.0.clone(),
                action,
                user_id: user_id.0,
                limit: limit.0,
                offset: offset.0,
            })
            .await?;

        Ok(Json(AuditQueryResponse {
            entries: entries.into_iter().map(Into::into).collect(),
            total,
        }))
    }
}
