// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::pagination::empty_string_as_none,
    models::{customer::CustomerResource, service_type::ServiceTypeResource, user::UserResource},
};

// ---
// Company (o "tenant")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Versão reduzida usada dentro de outros recursos (ex.: usuário).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompanySummary {
    pub id: i64,
    #[schema(example = "Barbearia Centro")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyResource {
    pub id: i64,
    #[schema(example = "Barbearia Centro")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Relações: só entram no JSON quando foram carregadas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserResource>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_types: Option<Vec<ServiceTypeResource>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<CustomerResource>>,
}

impl From<Company> for CompanyResource {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            created_at: company.created_at,
            updated_at: company.updated_at,
            users: None,
            service_types: None,
            customers: None,
        }
    }
}

impl CompanyResource {
    pub fn with_service_types(mut self, service_types: Vec<ServiceTypeResource>) -> Self {
        self.service_types = Some(service_types);
        self
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyPayload {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    #[schema(example = "Barbearia Centro")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyPayload {
    #[serde(default, deserialize_with = "crate::models::trimmed_option")]
    #[validate(length(min = 1, max = 255, message = "O nome não pode ser vazio (máx. 255)."))]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CompanyFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<u32>,
}
