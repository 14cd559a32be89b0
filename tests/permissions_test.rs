// Module permission enforcement across the role and grant matrix

mod common;

use common::{bearer, create_user_with_token, setup_app};
use slotops_backend::api::{authenticate, require_admin, require_view, require_write};
use slotops_backend::errors::ApiError;
use slotops_backend::types::dto::common::ModulePermissionDto;
use slotops_backend::types::internal::permissions::{Module, Role};

#[tokio::test]
async fn admin_passes_every_module_check() {
    let app = setup_app().await;
    let token = create_user_with_token(&app, "boss", Role::Admin).await;
    let session = authenticate(&app, &bearer(&token)).await.unwrap();

    require_admin(&session).unwrap();
    for module in [Module::Keys, Module::Certificates, Module::Workhours] {
        require_view(&app, &session, module).await.unwrap();
        require_write(&app, &session, module).await.unwrap();
    }
}

#[tokio::test]
async fn regular_user_without_grants_is_denied() {
    let app = setup_app().await;
    let token = create_user_with_token(&app, "operator", Role::User).await;
    let session = authenticate(&app, &bearer(&token)).await.unwrap();

    let err = require_admin(&session).expect_err("non-admin must fail");
    assert!(matches!(err, ApiError::PermissionDenied(_)));

    let err = require_view(&app, &session, Module::Keys)
        .await
        .expect_err("no grant must fail");
    assert!(matches!(err, ApiError::PermissionDenied(_)));
}

#[tokio::test]
async fn view_grant_does_not_imply_write() {
    let app = setup_app().await;
    let token = create_user_with_token(&app, "operator", Role::User).await;
    let session = authenticate(&app, &bearer(&token)).await.unwrap();

    app.permission_service
        .set_user_permissions(
            session.id,
            &[ModulePermissionDto {
                module: Module::Certificates,
                can_view: true,
                can_write: false,
            }],
        )
        .await
        .unwrap();

    require_view(&app, &session, Module::Certificates)
        .await
        .unwrap();
    let err = require_write(&app, &session, Module::Certificates)
        .await
        .expect_err("view-only grant must not allow writes");
    assert!(matches!(err, ApiError::PermissionDenied(_)));

    // Grant is scoped to the one module.
    let err = require_view(&app, &session, Module::Keys)
        .await
        .expect_err("other modules stay denied");
    assert!(matches!(err, ApiError::PermissionDenied(_)));
}

#[tokio::test]
async fn write_grant_implies_view() {
    let app = setup_app().await;
    let token = create_user_with_token(&app, "operator", Role::User).await;
    let session = authenticate(&app, &bearer(&token)).await.unwrap();

    app.permission_service
        .set_user_permissions(
            session.id,
            &[ModulePermissionDto {
                module: Module::Workhours,
                can_view: false,
                can_write: true,
            }],
        )
        .await
        .unwrap();

    require_view(&app, &session, Module::Workhours)
        .await
        .unwrap();
    require_write(&app, &session, Module::Workhours)
        .await
        .unwrap();
}

#[tokio::test]
async fn replacing_grants_revokes_old_ones() {
    let app = setup_app().await;
    let token = create_user_with_token(&app, "operator", Role::User).await;
    let session = authenticate(&app, &bearer(&token)).await.unwrap();

    app.permission_service
        .set_user_permissions(
            session.id,
            &[ModulePermissionDto {
                module: Module::Keys,
                can_view: true,
                can_write: true,
            }],
        )
        .await
        .unwrap();
    require_write(&app, &session, Module::Keys).await.unwrap();

    app.permission_service
        .set_user_permissions(
            session.id,
            &[ModulePermissionDto {
                module: Module::Certificates,
                can_view: true,
                can_write: false,
            }],
        )
        .await
        .unwrap();

    let err = require_view(&app, &session, Module::Keys)
        .await
        .expect_err("replaced grant must be gone");
    assert!(matches!(err, ApiError::PermissionDenied(_)));
    require_view(&app, &session, Module::Certificates)
        .await
        .unwrap();
}
