// src/handlers.rs

pub mod auth;
pub mod call_reports;
pub mod companies;
pub mod customers;
pub mod rbac;
pub mod service_types;
pub mod users;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, OriginalUri, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::common::{
    error::AppError,
    pagination::{Page, Paginated},
};

/// `Json<T>` com rejeição no formato de erro da API: campo faltando ou de
/// tipo errado vira 422 em `body`; JSON malformado vira 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::JsonDataError(err)) => Err(AppError::field("body", err.body_text())),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Envelope paginado usando o caminho e a query string originais.
pub(crate) fn paginated<T>(page: Page<T>, uri: &OriginalUri) -> Paginated<T> {
    Paginated::from_page(page, uri.path(), uri.query())
}

// GET /api/health
pub async fn health_check() -> &'static str {
    "OK"
}
