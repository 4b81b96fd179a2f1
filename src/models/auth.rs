// src/models/auth.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::user::UserResource;

/// Nome do cargo que ignora as checagens de política.
pub const SUPER_ADMIN_ROLE: &str = "Super-Admin";

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub company_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fotografia imutável de quem está chamando: carregada uma vez por
/// requisição e passada explicitamente para os serviços.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub company_id: Option<i64>,
    pub roles: BTreeSet<String>,
    /// Permissões diretas + herdadas dos cargos.
    pub permissions: BTreeSet<String>,
}

impl Caller {
    pub fn is_super_admin(&self) -> bool {
        self.roles.contains(SUPER_ADMIN_ROLE)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn belongs_to(&self, company_id: i64) -> bool {
        self.company_id == Some(company_id)
    }
}

// Dados para login: e-mail OU celular, mais a senha
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_login_identity"))]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "admin@empresa.com")]
    pub email: Option<String>,

    #[schema(example = "11999998888")]
    pub mobile: Option<String>,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

fn validate_login_identity(payload: &LoginUserPayload) -> Result<(), ValidationError> {
    let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

    if !has(&payload.email) && !has(&payload.mobile) {
        let mut err = ValidationError::new("required_without");
        err.message = Some("Informe o e-mail ou o celular.".into());
        return Err(err);
    }
    Ok(())
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResource,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,   // Subject (ID do usuário)
    pub jti: Uuid,  // ID do token em personal_access_tokens (permite revogar)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonalAccessToken {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(roles: &[&str], permissions: &[&str], company_id: Option<i64>) -> Caller {
        Caller {
            user_id: 1,
            company_id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn super_admin_is_recognized_by_role_name() {
        assert!(caller(&["Super-Admin"], &[], None).is_super_admin());
        assert!(!caller(&["Admin"], &["manage-users"], Some(1)).is_super_admin());
    }

    #[test]
    fn login_requires_email_or_mobile() {
        let neither = LoginUserPayload { email: None, mobile: Some("  ".into()), password: "secret".into() };
        assert!(neither.validate().is_err());

        let by_mobile = LoginUserPayload { email: None, mobile: Some("11999998888".into()), password: "secret".into() };
        assert!(by_mobile.validate().is_ok());

        let bad_email = LoginUserPayload { email: Some("nope".into()), mobile: None, password: "secret".into() };
        assert!(bad_email.validate().is_err());
    }
}
