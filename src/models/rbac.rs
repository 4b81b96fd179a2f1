// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// O que sai do banco (Tabela Roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Role {
    pub id: i64,

    #[schema(example = "Admin")]
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Cargo + quantidade de permissões (listagem)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RoleWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub role: Role,

    #[schema(example = 3)]
    pub permissions_count: i64,
}

// O que sai do banco (Tabela Permissions)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: i64,

    #[schema(example = "manage-service-types")]
    pub name: String,
}

// Resposta completa (Cargo + Lista de Permissões)
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleDetail {
    #[schema(example = "Admin")]
    pub role: String,

    pub permissions: Vec<String>,
}

// O Payload para conceder/revogar uma permissão de um cargo
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RolePermissionPayload {
    #[validate(length(min = 1, message = "O nome da permissão é obrigatório."))]
    #[schema(example = "see-call-reports")]
    pub permission_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RolePermissionsResponse {
    pub message: String,
    pub permissions: Vec<String>,
}
