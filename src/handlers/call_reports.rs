// src/handlers/call_reports.rs

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Paginated},
    config::AppState,
    handlers::{paginated, JsonBody},
    middleware::auth::AuthenticatedUser,
    models::call_report::{CallReportFilters, CallReportResource, IntakePayload, IntakeResponse},
};

// =============================================================================
//  INGESTÃO (automação, segredo estático)
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/call-reports/intake",
    tag = "Call Reports",
    request_body = IntakePayload,
    responses(
        (status = 201, description = "Relatório registrado", body = IntakeResponse),
        (status = 401, description = "Token da integração inválido"),
        (status = 422, description = "Dados inválidos"),
        (status = 500, description = "Token da integração não configurado")
    ),
    security(("intake_token" = []))
)]
pub async fn intake(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<IntakePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.call_report_service.intake(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(IntakeResponse {
            message: "Relatório de ligação registrado com sucesso.".into(),
            data: created,
        }),
    ))
}

// =============================================================================
//  CONSULTA
// =============================================================================

// GET /api/v1/call-reports (Super-Admin)
#[utoipa::path(
    get,
    path = "/api/v1/call-reports",
    tag = "Call Reports",
    params(CallReportFilters),
    responses(
        (status = 200, description = "Relatórios de todas as empresas", body = Paginated<CallReportResource>),
        (status = 403, description = "Apenas Super-Admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    uri: OriginalUri,
    Query(filters): Query<CallReportFilters>,
) -> Result<Json<Paginated<CallReportResource>>, AppError> {
    let page = app_state.call_report_service.list_all(&session.caller, &filters).await?;
    Ok(Json(paginated(page, &uri)))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{company}/call-reports",
    tag = "Call Reports",
    params(
        ("company" = i64, Path, description = "ID da empresa"),
        CallReportFilters
    ),
    responses(
        (status = 200, description = "Relatórios da empresa", body = Paginated<CallReportResource>),
        (status = 403, description = "Sem permissão para a empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn index_for_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(company_id): Path<i64>,
    uri: OriginalUri,
    Query(filters): Query<CallReportFilters>,
) -> Result<Json<Paginated<CallReportResource>>, AppError> {
    let page = app_state
        .call_report_service
        .list_for_company(&session.caller, company_id, &filters)
        .await?;
    Ok(Json(paginated(page, &uri)))
}

#[utoipa::path(
    get,
    path = "/api/v1/call-reports/{id}",
    tag = "Call Reports",
    params(("id" = i64, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Relatório com cliente, empresa e tipos de serviço", body = CallReportResource),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<CallReportResource>, AppError> {
    let report = app_state.call_report_service.show(&session.caller, id).await?;
    Ok(Json(report))
}

// =============================================================================
//  ALTERAÇÃO (sempre negada: relatórios são imutáveis)
// =============================================================================

#[utoipa::path(
    put,
    path = "/api/v1/call-reports/{id}",
    tag = "Call Reports",
    params(("id" = i64, Path, description = "ID do relatório")),
    responses(
        (status = 403, description = "Relatórios são imutáveis"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.call_report_service.update(&session.caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/call-reports/{id}",
    tag = "Call Reports",
    params(("id" = i64, Path, description = "ID do relatório")),
    responses(
        (status = 403, description = "Relatórios são imutáveis"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.call_report_service.delete(&session.caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
