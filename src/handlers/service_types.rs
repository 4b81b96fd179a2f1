// src/handlers/service_types.rs

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
    middleware::auth::AuthenticatedUser,
    models::service_type::{
        CreateServiceTypePayload, ServiceTypeFilters, ServiceTypeResource, UpdateServiceTypePayload,
    },
};

// =============================================================================
//  ROTAS ANINHADAS NA EMPRESA
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company}/service-types",
    tag = "Service Types",
    params(
        ("company" = i64, Path, description = "ID da empresa"),
        ServiceTypeFilters
    ),
    responses(
        (status = 200, description = "Tipos de serviço da empresa", body = Paginated<ServiceTypeResource>),
        (status = 403, description = "Sem permissão para a empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(company_id): Path<i64>,
    uri: OriginalUri,
    Query(filters): Query<ServiceTypeFilters>,
) -> Result<Json<Paginated<ServiceTypeResource>>, AppError> {
    let request = PageRequest::new(filters.page, filters.per_page);
    let page = app_state
        .service_type_service
        .list_for_company(&session.caller, company_id, request)
        .await?;
    Ok(Json(paginated(page, &uri)))
}

#[utoipa::path(
    post,
    path = "/api/v1/companies/{company}/service-types",
    tag = "Service Types",
    params(("company" = i64, Path, description = "ID da empresa")),
    request_body = CreateServiceTypePayload,
    responses(
        (status = 201, description = "Tipo de serviço criado", body = ServiceTypeResource),
        (status = 403, description = "Sem permissão para a empresa"),
        (status = 404, description = "Empresa não encontrada"),
        (status = 422, description = "Nome inválido ou já existente na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(company_id): Path<i64>,
    JsonBody(payload): JsonBody<CreateServiceTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let service_type = app_state
        .service_type_service
        .create(&session.caller, company_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(service_type)))
}

// =============================================================================
//  ROTAS PELO ID DO TIPO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/service-types/{id}",
    tag = "Service Types",
    params(("id" = i64, Path, description = "ID do tipo de serviço")),
    responses(
        (status = 200, description = "Tipo de serviço", body = ServiceTypeResource),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Tipo de serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ServiceTypeResource>, AppError> {
    Ok(Json(app_state.service_type_service.show(&session.caller, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/service-types/{id}",
    tag = "Service Types",
    params(("id" = i64, Path, description = "ID do tipo de serviço")),
    request_body = UpdateServiceTypePayload,
    responses(
        (status = 200, description = "Tipo de serviço atualizado", body = ServiceTypeResource),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Tipo de serviço não encontrado"),
        (status = 422, description = "Nome inválido ou já existente na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateServiceTypePayload>,
) -> Result<Json<ServiceTypeResource>, AppError> {
    payload.validate()?;

    let service_type = app_state
        .service_type_service
        .update(&session.caller, id, &payload)
        .await?;
    Ok(Json(service_type))
}

#[utoipa::path(
    delete,
    path = "/api/v1/service-types/{id}",
    tag = "Service Types",
    params(("id" = i64, Path, description = "ID do tipo de serviço")),
    responses(
        (status = 204, description = "Tipo de serviço removido"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Tipo de serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.service_type_service.delete(&session.caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
