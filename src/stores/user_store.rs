use std::collections::HashMap;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::DomainError;
use crate::types::db::{user, user_permission};
use crate::types::internal::permissions::Role;

/// Partial user update. Absent fields are left unchanged.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Repository for user accounts
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::database("count_users", e))
    }

    pub async fn list(
        &self,
    ) -> Result<Vec<(user::Model, Vec<user_permission::Model>)>, DomainError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_users", e))?;

        let permissions = user_permission::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_user_permissions", e))?;

        let mut by_user: HashMap<i32, Vec<user_permission::Model>> = HashMap::new();
        for permission in permissions {
            by_user.entry(permission.user_id).or_default().push(permission);
        }

        Ok(users
            .into_iter()
            .map(|u| {
                let perms = by_user.remove(&u.id).unwrap_or_default();
                (u, perms)
            })
            .collect())
    }

    pub async fn get(
        &self,
        id: i32,
    ) -> Result<(user::Model, Vec<user_permission::Model>), DomainError> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_user", e))?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let permissions = user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(id))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("get_user_permissions", e))?;

        Ok((model, permissions))
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user::Model>, DomainError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("find_user_by_username", e))
    }

    pub async fn create(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<user::Model, DomainError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::validation("Username and password are required"));
        }

        if self.find_by_username(username).await?.is_some() {
            return Err(DomainError::conflict("Username already exists"));
        }

        let now = Utc::now().timestamp();
        let row = user::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            role: Set(role.as_str().to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| DomainError::database("create_user", e))
    }

    /// Apply changes to a user. Returns the record before and after the write.
    pub async fn update(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<(user::Model, user::Model), DomainError> {
        let old = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_user", e))?
            .ok_or_else(|| DomainError::not_found("User"))?;

        if let Some(username) = &changes.username {
            let username = username.trim();
            if username.is_empty() {
                return Err(DomainError::validation("Username cannot be empty"));
            }
            if username != old.username && self.find_by_username(username).await?.is_some() {
                return Err(DomainError::conflict("Username already exists"));
            }
        }

        let mut row: user::ActiveModel = old.clone().into();
        if let Some(username) = changes.username {
            row.username = Set(username.trim().to_string());
        }
        if let Some(password) = changes.password {
            if password.is_empty() {
                return Err(DomainError::validation("Password cannot be empty"));
            }
            row.password_hash = Set(hash_password(&password)?);
        }
        if let Some(role) = changes.role {
            row.role = Set(role.as_str().to_string());
        }
        if let Some(is_active) = changes.is_active {
            row.is_active = Set(is_active);
        }
        row.updated_at = Set(Utc::now().timestamp());

        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("update_user", e))?;

        Ok((old, updated))
    }

    /// Delete a user. Self-deletion is always rejected, admin or not.
    pub async fn delete(&self, actor_id: i32, id: i32) -> Result<user::Model, DomainError> {
        if actor_id == id {
            return Err(DomainError::validation("Cannot delete your own account"));
        }

        let old = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_user", e))?
            .ok_or_else(|| DomainError::not_found("User"))?;

        user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::database("delete_user", e))?;

        Ok(old)
    }

    /// Check a login attempt. Returns None for unknown usernames, wrong
    /// passwords and deactivated accounts alike.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<user::Model>, DomainError> {
        let Some(model) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        if !model.is_active {
            return Ok(None);
        }

        if verify_password(&model.password_hash, password) {
            Ok(Some(model))
        } else {
            Ok(None)
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> UserStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserStore::new(db)
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username() {
        let store = setup().await;
        store.create("alice", "secret1", Role::User).await.unwrap();

        let result = store.create("alice", "secret2", Role::User).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_hashes_password() {
        let store = setup().await;
        let created = store.create("bob", "hunter2", Role::User).await.unwrap();

        assert_ne!(created.password_hash, "hunter2");
        assert!(verify_password(&created.password_hash, "hunter2"));
        assert!(!verify_password(&created.password_hash, "wrong"));
    }

    #[tokio::test]
    async fn verify_credentials_rejects_inactive_user() {
        let store = setup().await;
        let created = store.create("carol", "pass", Role::User).await.unwrap();

        assert!(store
            .verify_credentials("carol", "pass")
            .await
            .unwrap()
            .is_some());

        store
            .update(
                created.id,
                UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(store
            .verify_credentials("carol", "pass")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_rejects_self_deletion() {
        let store = setup().await;
        let admin = store.create("admin", "pass", Role::Admin).await.unwrap();

        let result = store.delete(admin.id, admin.id).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        // Still present
        assert!(store.get(admin.id).await.is_ok());
    }

    #[tokio::test]
    async fn update_rejects_username_collision() {
        let store = setup().await;
        store.create("first", "pass", Role::User).await.unwrap();
        let second = store.create("second", "pass", Role::User).await.unwrap();

        let result = store
            .update(
                second.id,
                UserChanges {
                    username: Some("first".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }
}
