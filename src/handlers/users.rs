// src/handlers/users.rs

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    config::AppState,
    handlers::{paginated, JsonBody},
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermManageUsers, PermSeeUsers, RequirePermission},
    },
    models::user::{CreateUserPayload, UpdateUserPayload, UserFilters, UserResource},
};

// GET /api/v1/users (see-users)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(UserFilters),
    responses(
        (status = 200, description = "Usuários com seus cargos", body = Paginated<UserResource>),
        (status = 403, description = "Sem a permissão see-users")
    ),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSeeUsers>,
    AuthenticatedUser(session): AuthenticatedUser,
    uri: OriginalUri,
    Query(filters): Query<UserFilters>,
) -> Result<Json<Paginated<UserResource>>, AppError> {
    let request = PageRequest::new(filters.page, filters.per_page);
    let page = app_state.user_service.list(&session.caller, request).await?;
    Ok(Json(paginated(page, &uri)))
}

// POST /api/v1/users (manage-users)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserResource),
        (status = 403, description = "Sem a permissão manage-users"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageUsers>,
    AuthenticatedUser(session): AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state.user_service.create(&session.caller, &payload).await?;
    Ok((StatusCode::CREATED, Json(UserResource::from(detail))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário com empresa, cargos e permissões diretas", body = UserResource),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSeeUsers>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResource>, AppError> {
    let detail = app_state.user_service.show(&session.caller, id).await?;
    Ok(Json(UserResource::from(detail)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserResource),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Usuário não encontrado"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageUsers>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateUserPayload>,
) -> Result<Json<UserResource>, AppError> {
    payload.validate()?;

    let detail = app_state.user_service.update(&session.caller, id, &payload).await?;
    Ok(Json(UserResource::from(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageUsers>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.user_service.delete(&session.caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
