// src/handlers/companies.rs
//
// CRUD de empresas. Todas as rotas são exclusivas do Super-Admin; a checagem
// fica no CompanyService.

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
    models::company::{CompanyFilters, CompanyResource, CreateCompanyPayload, UpdateCompanyPayload},
};

#[utoipa::path(
    get,
    path = "/api/v1/companies",
    tag = "Companies",
    params(CompanyFilters),
    responses(
        (status = 200, description = "Empresas com seus tipos de serviço", body = Paginated<CompanyResource>),
        (status = 403, description = "Apenas Super-Admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    uri: OriginalUri,
    Query(filters): Query<CompanyFilters>,
) -> Result<Json<Paginated<CompanyResource>>, AppError> {
    let request = PageRequest::new(filters.page, filters.per_page);
    let page = app_state.company_service.list(&session.caller, request).await?;
    Ok(Json(paginated(page, &uri)))
}

#[utoipa::path(
    post,
    path = "/api/v1/companies",
    tag = "Companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = CompanyResource),
        (status = 403, description = "Apenas Super-Admin"),
        (status = 422, description = "Nome inválido ou já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state.company_service.create(&session.caller, &payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company}",
    tag = "Companies",
    params(("company" = i64, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa", body = CompanyResource),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<CompanyResource>, AppError> {
    Ok(Json(app_state.company_service.show(&session.caller, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/companies/{company}",
    tag = "Companies",
    params(("company" = i64, Path, description = "ID da empresa")),
    request_body = UpdateCompanyPayload,
    responses(
        (status = 200, description = "Empresa atualizada", body = CompanyResource),
        (status = 404, description = "Empresa não encontrada"),
        (status = 422, description = "Nome inválido ou já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateCompanyPayload>,
) -> Result<Json<CompanyResource>, AppError> {
    payload.validate()?;

    let company = app_state.company_service.update(&session.caller, id, &payload).await?;
    Ok(Json(company))
}

#[utoipa::path(
    delete,
    path = "/api/v1/companies/{company}",
    tag = "Companies",
    params(("company" = i64, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa removida"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.company_service.delete(&session.caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
