// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::JsonBody,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermManagePerms, PermManageRoles, RequirePermission},
    },
    models::rbac::{RoleDetail, RolePermissionPayload, RolePermissionsResponse, RoleWithCount},
};

// GET /api/v1/roles
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "RBAC",
    responses(
        (status = 200, description = "Cargos com a quantidade de permissões", body = Vec<RoleWithCount>),
        (status = 403, description = "Sem a permissão manage-roles")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageRoles>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<Vec<RoleWithCount>>, AppError> {
    Ok(Json(app_state.rbac_service.list_roles(&session.caller).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    tag = "RBAC",
    params(("id" = i64, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Cargo e suas permissões", body = RoleDetail),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn show_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageRoles>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(role_id): Path<i64>,
) -> Result<Json<RoleDetail>, AppError> {
    Ok(Json(app_state.rbac_service.show_role(&session.caller, role_id).await?))
}

// POST /api/v1/roles/{id}/permissions
#[utoipa::path(
    post,
    path = "/api/v1/roles/{id}/permissions",
    tag = "RBAC",
    params(("id" = i64, Path, description = "ID do cargo")),
    request_body = RolePermissionPayload,
    responses(
        (status = 200, description = "Permissão concedida", body = RolePermissionsResponse),
        (status = 404, description = "Cargo não encontrado"),
        (status = 422, description = "Permissão inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageRoles>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(role_id): Path<i64>,
    JsonBody(payload): JsonBody<RolePermissionPayload>,
) -> Result<Json<RolePermissionsResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .rbac_service
        .assign_permission(&session.caller, role_id, &payload.permission_name)
        .await?;
    Ok(Json(response))
}

// DELETE /api/v1/roles/{id}/permissions
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}/permissions",
    tag = "RBAC",
    params(("id" = i64, Path, description = "ID do cargo")),
    request_body = RolePermissionPayload,
    responses(
        (status = 200, description = "Permissão revogada", body = RolePermissionsResponse),
        (status = 400, description = "O cargo não possui a permissão"),
        (status = 404, description = "Cargo não encontrado"),
        (status = 422, description = "Permissão inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManageRoles>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(role_id): Path<i64>,
    JsonBody(payload): JsonBody<RolePermissionPayload>,
) -> Result<Json<RolePermissionsResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .rbac_service
        .revoke_permission(&session.caller, role_id, &payload.permission_name)
        .await?;
    Ok(Json(response))
}

// GET /api/v1/permissions (para o frontend montar a tela de cargos)
#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Nomes das permissões", body = Vec<String>),
        (status = 403, description = "Sem a permissão manage-perms")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermManagePerms>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(app_state.rbac_service.list_permission_names(&session.caller).await?))
}
