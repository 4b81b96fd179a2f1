// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, LoginUserPayload, MessageResponse},
        user::UserResource,
    },
};

// Handler de login (e-mail ou celular)
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 422, description = "Dados inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let (token, user) = app_state.auth_service.login_user(&payload).await?;
    let detail = app_state.user_service.detail(user).await?;

    Ok(Json(AuthResponse {
        token,
        user: UserResource::from(detail),
    }))
}

// Revoga apenas o token usado nesta requisição
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Token revogado", body = MessageResponse),
        (status = 401, description = "Token inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.auth_service.logout(session.token_id).await?;

    Ok(Json(MessageResponse {
        message: "Logout realizado com sucesso.".into(),
    }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = UserResource),
        (status = 401, description = "Token inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<UserResource>, AppError> {
    let detail = app_state.user_service.detail(session.user.clone()).await?;
    Ok(Json(UserResource::from(detail)))
}
