// src/models/service_type.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::pagination::empty_string_as_none;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceType {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceTypeResource {
    pub id: i64,
    #[schema(example = "Corte de cabelo")]
    pub name: String,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceType> for ServiceTypeResource {
    fn from(service_type: ServiceType) -> Self {
        Self {
            id: service_type.id,
            name: service_type.name,
            company_id: service_type.company_id,
            created_at: service_type.created_at,
            updated_at: service_type.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateServiceTypePayload {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    #[schema(example = "Corte de cabelo")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceTypePayload {
    #[serde(default, deserialize_with = "crate::models::trimmed_option")]
    #[validate(length(min = 1, max = 255, message = "O nome não pode ser vazio (máx. 255)."))]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ServiceTypeFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<u32>,
}
