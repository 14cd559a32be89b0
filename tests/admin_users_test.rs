// Admin user endpoints over the HTTP surface

mod common;

use common::{create_user_with_token, setup_app, test_client};
use poem::http::StatusCode;
use slotops_backend::api::AdminApi;
use slotops_backend::types::dto::common::ModulePermissionDto;
use slotops_backend::types::internal::permissions::{Module, Role};

#[tokio::test]
async fn get_single_user_returns_record_with_matrix() {
    let app = setup_app().await;
    let admin_token = create_user_with_token(&app, "boss", Role::Admin).await;
    let user = app
        .user_store
        .create("operator", "password123", Role::User)
        .await
        .unwrap();
    app.permission_service
        .set_user_permissions(
            user.id,
            &[ModulePermissionDto {
                module: Module::Keys,
                can_view: true,
                can_write: false,
            }],
        )
        .await
        .unwrap();

    let cli = test_client(AdminApi::new(app.clone()));
    let resp = cli
        .get(format!("/admin/users/{}", user.id))
        .header("Authorization", format!("Bearer {admin_token}"))
        .send()
        .await;
    resp.assert_status_is_ok();

    let json = resp.json().await;
    let body = json.value().object();
    body.get("username").assert_string("operator");
    body.get("role").assert_string("USER");
    assert_eq!(body.get("permissions").array().len(), 1);
}

#[tokio::test]
async fn get_single_user_requires_admin_role() {
    let app = setup_app().await;
    let op_token = create_user_with_token(&app, "operator", Role::User).await;

    let cli = test_client(AdminApi::new(app.clone()));
    let resp = cli
        .get("/admin/users/1")
        .header("Authorization", format!("Bearer {op_token}"))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn get_single_user_unknown_id_is_not_found() {
    let app = setup_app().await;
    let admin_token = create_user_with_token(&app, "boss", Role::Admin).await;

    let cli = test_client(AdminApi::new(app.clone()));
    let resp = cli
        .get("/admin/users/9999")
        .header("Authorization", format!("Bearer {admin_token}"))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}
