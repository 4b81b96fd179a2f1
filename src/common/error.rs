use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Erros por campo: "profile.phone" -> ["mensagem", ...]
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    // Erros de validação que só aparecem depois de consultar o banco
    // (unicidade, existência de registros relacionados, etc.)
    #[error("Erro de validação: {0:?}")]
    FieldValidation(FieldErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Token da integração não configurado")]
    IntakeMisconfigured,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Atalho para um erro 422 em um único campo.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        AppError::FieldValidation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::FieldValidation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Achata os erros do `validator` (inclusive structs aninhadas e listas)
/// no formato "campo.subcampo" -> mensagens.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    collect_errors("", errors, &mut out);
    out
}

fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(key).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(&format!("{}.{}", key, index), inner, out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            AppError::ValidationError(ref errors) => {
                return validation_response(flatten_validation_errors(errors));
            }
            AppError::FieldValidation(details) => return validation_response(details),
            AppError::InvalidCredentials => "Credenciais inválidas.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::Forbidden(reason) => reason,
            AppError::NotFound(resource) => format!("{} não encontrado.", resource),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                "Registro não encontrado.".to_string()
            }
            AppError::BadRequest(message) => message,
            AppError::IntakeMisconfigured => {
                tracing::error!("INTAKE_TOKEN não está definido; rejeitando ingestão");
                "Servidor mal configurado.".to_string()
            }

            // Todos os outros erros (banco, bcrypt, jwt, anyhow) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

fn validation_response(details: FieldErrors) -> Response {
    let body = Json(json!({
        "error": "Um ou mais campos são inválidos.",
        "details": details,
    }));
    (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "obrigatório"))]
        phone: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "obrigatório"))]
        name: String,
        #[validate(nested)]
        profile: Inner,
    }

    #[test]
    fn nested_errors_are_flattened_with_dotted_keys() {
        let payload = Outer {
            name: String::new(),
            profile: Inner { phone: String::new() },
        };
        let errors = payload.validate().unwrap_err();
        let flat = flatten_validation_errors(&errors);

        assert_eq!(flat.get("name"), Some(&vec!["obrigatório".to_string()]));
        assert_eq!(flat.get("profile.phone"), Some(&vec!["obrigatório".to_string()]));
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::field("name", "x").status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Cliente").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::IntakeMisconfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
