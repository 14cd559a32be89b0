// End-to-end authentication flow against an in-memory database

mod common;

use common::{bearer, create_user_with_token, setup_app};
use slotops_backend::api::authenticate;
use slotops_backend::errors::ApiError;
use slotops_backend::stores::user_store::UserChanges;
use slotops_backend::types::internal::permissions::Role;

#[tokio::test]
async fn login_and_authenticate_round_trip() {
    let app = setup_app().await;

    let user = app
        .user_store
        .create("operator", "hunter22hunter", Role::User)
        .await
        .unwrap();

    let verified = app
        .user_store
        .verify_credentials("operator", "hunter22hunter")
        .await
        .unwrap()
        .expect("credentials should verify");
    assert_eq!(verified.id, user.id);

    let token = app.token_service.generate_jwt(&verified).unwrap();
    let session = authenticate(&app, &bearer(&token)).await.unwrap();
    assert_eq!(session.id, user.id);
    assert_eq!(session.username, "operator");
    assert_eq!(session.role, Role::User);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = setup_app().await;
    app.user_store
        .create("operator", "correct-password", Role::User)
        .await
        .unwrap();

    let result = app
        .user_store
        .verify_credentials("operator", "wrong-password")
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn garbage_token_is_unauthenticated() {
    let app = setup_app().await;

    let err = authenticate(&app, &bearer("not-a-jwt"))
        .await
        .expect_err("garbage token must fail");
    assert!(matches!(err, ApiError::Unauthenticated(_)));
}

#[tokio::test]
async fn deactivated_user_loses_access_immediately() {
    let app = setup_app().await;
    let token = create_user_with_token(&app, "operator", Role::User).await;

    // Token still valid, account check must reject anyway.
    let session = authenticate(&app, &bearer(&token)).await.unwrap();
    app.user_store
        .update(
            session.id,
            UserChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = authenticate(&app, &bearer(&token))
        .await
        .expect_err("deactivated account must fail");
    assert!(matches!(err, ApiError::Unauthenticated(_)));
}

#[tokio::test]
async fn token_from_deleted_user_is_rejected() {
    let app = setup_app().await;
    let admin_token = create_user_with_token(&app, "admin", Role::Admin).await;
    let token = create_user_with_token(&app, "shortlived", Role::User).await;

    let admin = authenticate(&app, &bearer(&admin_token)).await.unwrap();
    let victim = authenticate(&app, &bearer(&token)).await.unwrap();
    app.user_store.delete(admin.id, victim.id).await.unwrap();

    let err = authenticate(&app, &bearer(&token))
        .await
        .expect_err("deleted account must fail");
    assert!(matches!(err, ApiError::Unauthenticated(_)));
}
