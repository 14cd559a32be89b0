use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::errors::{DatabaseError, DomainError};
use crate::types::db::{user, user_permission};
use crate::types::dto::common::ModulePermissionDto;
use crate::types::internal::permissions::{Module, Permission, Role};

/// Module permission checks and grants.
///
/// Checks read the database on every call so a permission change or a
/// deactivation takes effect immediately, not at next login.
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether the user currently holds the given permission on the module.
    ///
    /// Unknown or deactivated users have no permissions. Admins hold every
    /// permission implicitly and carry no permission rows.
    pub async fn has_permission(
        &self,
        user_id: i32,
        module: Module,
        permission: Permission,
    ) -> Result<bool, DomainError> {
        let user = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_user", e))?;

        let user = match user {
            Some(user) if user.is_active => user,
            _ => return Ok(false),
        };

        if Role::parse(&user.role) == Some(Role::Admin) {
            return Ok(true);
        }

        let row = user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .filter(user_permission::Column::Module.eq(module.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_user_permission", e))?;

        Ok(match row {
            Some(row) => match permission {
                Permission::View => row.can_view,
                Permission::Write => row.can_write,
            },
            None => false,
        })
    }

    pub async fn get_user_permissions(
        &self,
        user_id: i32,
    ) -> Result<Vec<user_permission::Model>, DomainError> {
        user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_user_permissions", e))
    }

    /// Replace the user's permission rows with the given set.
    ///
    /// Write access implies view access, so `can_view` is forced on
    /// wherever `can_write` is granted.
    pub async fn set_user_permissions(
        &self,
        user_id: i32,
        permissions: &[ModulePermissionDto],
    ) -> Result<(), DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        user_permission::Entity::delete_many()
            .filter(user_permission::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| DomainError::database("delete_user_permissions", e))?;

        for grant in permissions {
            user_permission::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                module: Set(grant.module.as_str().to_string()),
                can_view: Set(grant.can_view || grant.can_write),
                can_write: Set(grant.can_write),
            }
            .insert(&txn)
            .await
            .map_err(|e| DomainError::database("insert_user_permission", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::UserStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (PermissionService, UserStore) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (PermissionService::new(db.clone()), UserStore::new(db))
    }

    async fn create_user(users: &UserStore, username: &str, role: Role) -> i32 {
        users.create(username, "password123", role).await.unwrap().id
    }

    #[tokio::test]
    async fn admin_holds_every_permission_without_rows() {
        let (service, users) = setup().await;
        let admin_id = create_user(&users, "admin", Role::Admin).await;

        for module in [Module::Keys, Module::Certificates, Module::Workhours] {
            assert!(service
                .has_permission(admin_id, module, Permission::Write)
                .await
                .unwrap());
        }
        assert!(service.get_user_permissions(admin_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_without_rows_has_no_access() {
        let (service, users) = setup().await;
        let user_id = create_user(&users, "tech", Role::User).await;

        assert!(!service
            .has_permission(user_id, Module::Keys, Permission::View)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn view_grant_does_not_imply_write() {
        let (service, users) = setup().await;
        let user_id = create_user(&users, "tech", Role::User).await;

        service
            .set_user_permissions(
                user_id,
                &[ModulePermissionDto {
                    module: Module::Keys,
                    can_view: true,
                    can_write: false,
                }],
            )
            .await
            .unwrap();

        assert!(service
            .has_permission(user_id, Module::Keys, Permission::View)
            .await
            .unwrap());
        assert!(!service
            .has_permission(user_id, Module::Keys, Permission::Write)
            .await
            .unwrap());
        assert!(!service
            .has_permission(user_id, Module::Certificates, Permission::View)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn write_grant_forces_view_on() {
        let (service, users) = setup().await;
        let user_id = create_user(&users, "tech", Role::User).await;

        service
            .set_user_permissions(
                user_id,
                &[ModulePermissionDto {
                    module: Module::Workhours,
                    can_view: false,
                    can_write: true,
                }],
            )
            .await
            .unwrap();

        let rows = service.get_user_permissions(user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].can_view);
        assert!(rows[0].can_write);
    }

    #[tokio::test]
    async fn setting_permissions_replaces_previous_grants() {
        let (service, users) = setup().await;
        let user_id = create_user(&users, "tech", Role::User).await;

        service
            .set_user_permissions(
                user_id,
                &[
                    ModulePermissionDto {
                        module: Module::Keys,
                        can_view: true,
                        can_write: true,
                    },
                    ModulePermissionDto {
                        module: Module::Certificates,
                        can_view: true,
                        can_write: false,
                    },
                ],
            )
            .await
            .unwrap();

        service
            .set_user_permissions(
                user_id,
                &[ModulePermissionDto {
                    module: Module::Certificates,
                    can_view: true,
                    can_write: false,
                }],
            )
            .await
            .unwrap();

        assert!(!service
            .has_permission(user_id, Module::Keys, Permission::View)
            .await
            .unwrap());
        assert_eq!(service.get_user_permissions(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deactivated_user_loses_access_immediately() {
        let (service, users) = setup().await;
        let user_id = create_user(&users, "tech", Role::User).await;
        service
            .set_user_permissions(
                user_id,
                &[ModulePermissionDto {
                    module: Module::Keys,
                    can_view: true,
                    can_write: true,
                }],
            )
            .await
            .unwrap();

        users
            .update(
                user_id,
                crate::stores::user_store::UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!service
            .has_permission(user_id, Module::Keys, Permission::View)
            .await
            .unwrap());
    }
}
