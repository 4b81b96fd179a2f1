// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::pagination::empty_string_as_none,
    models::{auth::User, company::CompanySummary},
};

/// Forma pública do usuário. Relações só aparecem quando foram carregadas.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResource {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,

    // Some(None) => carregada, mas o usuário não tem empresa (serializa null)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<CompanySummary>)]
    pub company: Option<Option<CompanySummary>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResource {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            mobile: user.mobile,
            company: None,
            roles: None,
            permissions: None,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl UserResource {
    pub fn with_company(mut self, company: Option<CompanySummary>) -> Self {
        self.company = Some(company);
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Usuário com seus vínculos já resolvidos (cargos, permissões diretas, empresa).
#[derive(Debug, Clone)]
pub struct UserDetail {
    pub user: User,
    pub company: Option<CompanySummary>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<UserDetail> for UserResource {
    fn from(detail: UserDetail) -> Self {
        UserResource::from(detail.user)
            .with_company(detail.company)
            .with_roles(detail.roles)
            .with_permissions(detail.permissions)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."), length(max = 255))]
    #[schema(example = "maria@empresa.com")]
    pub email: String,

    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O celular é obrigatório."))]
    #[schema(example = "11999998888")]
    pub mobile: String,

    #[validate(
        length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."),
        must_match(other = "password_confirmation", message = "A confirmação da senha não confere.")
    )]
    pub password: String,

    pub password_confirmation: String,

    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    #[schema(example = "Admin")]
    pub role: String,

    pub permissions: Option<Vec<String>>,

    #[schema(example = 1)]
    pub company_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[serde(default, deserialize_with = "crate::models::trimmed_option")]
    #[validate(length(min = 1, max = 255, message = "O nome deve ter entre 1 e 255 caracteres."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "O cargo não pode ser vazio."))]
    pub role: Option<String>,

    /// Substitui todas as permissões diretas.
    pub permissions: Option<Vec<String>>,

    /// Ausente = mantém; `null` = remove o vínculo com a empresa.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[schema(value_type = Option<i64>)]
    pub company_id: Option<Option<i64>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(password: &str, confirmation: &str) -> CreateUserPayload {
        CreateUserPayload {
            name: "Maria".into(),
            email: "maria@empresa.com".into(),
            mobile: "11999998888".into(),
            password: password.into(),
            password_confirmation: confirmation.into(),
            role: "Admin".into(),
            permissions: None,
            company_id: Some(1),
        }
    }

    #[test]
    fn password_must_be_confirmed() {
        assert!(payload("segredo123", "segredo123").validate().is_ok());
        assert!(payload("segredo123", "outra-coisa").validate().is_err());
        assert!(payload("curta", "curta").validate().is_err());
    }

    #[test]
    fn company_id_distinguishes_null_from_missing() {
        let missing: UpdateUserPayload = serde_json::from_str(r#"{"name": "Ana"}"#).unwrap();
        assert_eq!(missing.company_id, None);

        let cleared: UpdateUserPayload = serde_json::from_str(r#"{"company_id": null}"#).unwrap();
        assert_eq!(cleared.company_id, Some(None));

        let set: UpdateUserPayload = serde_json::from_str(r#"{"company_id": 7}"#).unwrap();
        assert_eq!(set.company_id, Some(Some(7)));
    }

    #[test]
    fn company_relation_serializes_only_when_loaded() {
        let now = Utc::now();
        let user = User {
            id: 1,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            mobile: None,
            password_hash: "hash".into(),
            company_id: None,
            created_at: now,
            updated_at: now,
        };

        let plain = serde_json::to_value(UserResource::from(user.clone())).unwrap();
        assert!(plain.get("company").is_none());
        assert!(plain.get("password_hash").is_none());

        let loaded = serde_json::to_value(UserResource::from(user).with_company(None)).unwrap();
        assert!(loaded.get("company").unwrap().is_null());
    }
}
