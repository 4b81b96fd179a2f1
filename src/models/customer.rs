// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::pagination::empty_string_as_none;

// --- CLIENTE (global, identificado pelo telefone) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub phone: String,
    pub name: String,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// "nome sobrenome", sem espaços sobrando quando não há sobrenome.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.lastname.as_deref().unwrap_or_default())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerResource {
    pub id: i64,
    #[schema(example = "5511999998888")]
    pub phone: String,
    #[schema(example = "Maria Silva")]
    pub name: String,
    pub email: Option<String>,
}

impl From<Customer> for CustomerResource {
    fn from(customer: Customer) -> Self {
        Self {
            name: customer.full_name(),
            id: customer.id,
            phone: customer.phone,
            email: customer.email,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerPayload {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    #[schema(example = "Maria")]
    pub name: String,

    #[validate(length(max = 255))]
    #[schema(example = "Silva")]
    pub lastname: Option<String>,

    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 20, message = "O telefone é obrigatório (máx. 20)."))]
    #[schema(example = "5511999998888")]
    pub phone: String,

    #[validate(email(message = "O e-mail fornecido é inválido."), length(max = 255))]
    pub email: Option<String>,

    /// Só é considerado quando quem chama é Super-Admin.
    pub company_ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerPayload {
    #[serde(default, deserialize_with = "crate::models::trimmed_option")]
    #[validate(length(min = 1, max = 255, message = "O nome deve ter entre 1 e 255 caracteres."))]
    pub name: Option<String>,

    // Ausente = mantém; null = limpa
    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[schema(value_type = Option<String>)]
    pub lastname: Option<Option<String>>,

    #[serde(default, deserialize_with = "crate::models::trimmed_option")]
    #[validate(length(min = 1, max = 20, message = "O telefone deve ter entre 1 e 20 caracteres."))]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
}

impl UpdateCustomerPayload {
    /// O `validator` não enxerga dentro de `Option<Option<_>>`; checamos aqui.
    pub fn validate_nullable_fields(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();

        if let Some(Some(lastname)) = &self.lastname {
            if lastname.chars().count() > 255 {
                let mut err = validator::ValidationError::new("length");
                err.message = Some("O sobrenome deve ter no máximo 255 caracteres.".into());
                errors.add("lastname", err);
            }
        }

        if let Some(Some(email)) = &self.email {
            if !validator::ValidateEmail::validate_email(email) {
                let mut err = validator::ValidationError::new("email");
                err.message = Some("O e-mail fornecido é inválido.".into());
                errors.add("email", err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CustomerFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(lastname: Option<&str>) -> Customer {
        let now = Utc::now();
        Customer {
            id: 1,
            phone: "5511999998888".into(),
            name: "Maria".into(),
            lastname: lastname.map(str::to_string),
            email: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn resource_combines_name_and_lastname() {
        assert_eq!(CustomerResource::from(customer(Some("Silva"))).name, "Maria Silva");
        assert_eq!(CustomerResource::from(customer(None)).name, "Maria");
    }

    #[test]
    fn nullable_fields_are_validated_when_present() {
        let ok: UpdateCustomerPayload =
            serde_json::from_str(r#"{"lastname": null, "email": "a@b.com"}"#).unwrap();
        assert!(ok.validate_nullable_fields().is_ok());

        let bad: UpdateCustomerPayload = serde_json::from_str(r#"{"email": "not-an-email"}"#).unwrap();
        assert!(bad.validate_nullable_fields().is_err());
    }

    #[test]
    fn blank_phone_and_name_are_rejected() {
        let create: CreateCustomerPayload =
            serde_json::from_str(r#"{"name": "  ", "phone": " \t "}"#).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
        assert!(errors.field_errors().contains_key("name"));

        let update: UpdateCustomerPayload = serde_json::from_str(r#"{"phone": "   "}"#).unwrap();
        assert!(update.validate().unwrap_err().field_errors().contains_key("phone"));

        let padded: CreateCustomerPayload =
            serde_json::from_str(r#"{"name": " Maria ", "phone": " 5511999998888 "}"#).unwrap();
        assert!(padded.validate().is_ok());
        assert_eq!(padded.phone, "5511999998888");
        assert_eq!(padded.name, "Maria");
    }
}
