mod common;

use anyhow::Result;
use callhub_backend::{
    common::error::AppError,
    models::{auth::LoginUserPayload, user::CreateUserPayload},
};
use serde_json::json;
use sqlx::PgPool;

fn new_user(email: &str, mobile: &str, role: &str, company_id: Option<i64>) -> CreateUserPayload {
    common::from_json(json!({
        "name": "Operador",
        "email": email,
        "mobile": mobile,
        "password": "senha-forte-123",
        "password_confirmation": "senha-forte-123",
        "role": role,
        "company_id": company_id
    }))
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn login_issues_a_token_that_logout_revokes(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let company = common::create_company(&pool, "Barbearia Centro").await;

    state
        .user_service
        .create(&common::super_admin(), &new_user("op@empresa.com", "11999990000", "Admin", Some(company)))
        .await?;

    let login: LoginUserPayload = common::from_json(json!({ "mobile": "11999990000", "password": "senha-forte-123" }));
    let (token, user) = state.auth_service.login_user(&login).await?;
    assert_eq!(user.email, "op@empresa.com");

    let session = state.auth_service.validate_token(&token).await?;
    assert!(session.caller.has_permission("see-call-reports"));
    assert!(session.caller.belongs_to(company));

    state.auth_service.logout(session.token_id).await?;
    let err = state.auth_service.validate_token(&token).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn wrong_password_is_rejected(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    state
        .user_service
        .create(&common::super_admin(), &new_user("op@empresa.com", "11999990000", "Observer", None))
        .await?;

    let login: LoginUserPayload = common::from_json(json!({ "email": "op@empresa.com", "password": "errada" }));
    let err = state.auth_service.login_user(&login).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn only_super_admin_grants_super_admin(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let company = common::create_company(&pool, "Barbearia Centro").await;

    let mut manager = common::admin_of(company);
    manager.permissions.insert("manage-users".into());

    let err = state
        .user_service
        .create(&manager, &new_user("root2@empresa.com", "11999990001", "Super-Admin", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state
        .user_service
        .create(&manager, &new_user("x@empresa.com", "11999990002", "Inexistente", None))
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::FieldValidation(fields) if fields.contains_key("role")));
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn revoking_a_permission_the_role_lacks_is_a_bad_request(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let root = common::super_admin();

    let observer: i64 = sqlx::query_scalar("SELECT id FROM roles WHERE name = 'Observer'")
        .fetch_one(&pool)
        .await?;

    let err = state
        .rbac_service
        .revoke_permission(&root, observer, "manage-roles")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let granted = state.rbac_service.assign_permission(&root, observer, "manage-roles").await?;
    assert!(granted.permissions.contains(&"manage-roles".to_string()));

    // Conceder de novo não duplica
    let again = state.rbac_service.assign_permission(&root, observer, "manage-roles").await?;
    assert_eq!(again.permissions.len(), granted.permissions.len());

    let err = state
        .rbac_service
        .assign_permission(&root, observer, "nao-existe")
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::FieldValidation(fields) if fields.contains_key("permission_name")));
    Ok(())
}
