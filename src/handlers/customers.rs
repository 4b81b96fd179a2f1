// src/handlers/customers.rs

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
    models::customer::{CreateCustomerPayload, CustomerFilters, CustomerResource, UpdateCustomerPayload},
};

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "Customers",
    params(CustomerFilters),
    responses(
        (status = 200, description = "Clientes visíveis para quem chamou", body = Paginated<CustomerResource>)
    ),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    uri: OriginalUri,
    Query(filters): Query<CustomerFilters>,
) -> Result<Json<Paginated<CustomerResource>>, AppError> {
    let page = app_state.customer_service.list(&session.caller, &filters).await?;
    Ok(Json(paginated(page, &uri)))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = CustomerResource),
        (status = 403, description = "Usuário sem empresa"),
        (status = 422, description = "Dados inválidos ou telefone/e-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state.customer_service.create(&session.caller, &payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = CustomerResource),
        (status = 403, description = "Cliente de outra empresa"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResource>, AppError> {
    Ok(Json(app_state.customer_service.show(&session.caller, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = CustomerResource),
        (status = 403, description = "Cliente de outra empresa"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 422, description = "Dados inválidos ou telefone/e-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateCustomerPayload>,
) -> Result<Json<CustomerResource>, AppError> {
    payload.validate()?;

    let customer = app_state.customer_service.update(&session.caller, id, &payload).await?;
    Ok(Json(customer))
}

// Super-Admin apaga o cliente; os demais só desvinculam da própria empresa.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido ou desvinculado"),
        (status = 403, description = "Cliente de outra empresa"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.customer_service.delete(&session.caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
