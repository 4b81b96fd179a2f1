// src/middleware/intake.rs
//
// Guarda da rota de ingestão: a automação envia um segredo estático
// (`INTAKE_TOKEN`) como bearer token. Não há usuário envolvido.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{common::error::AppError, config::AppState, middleware::auth::bearer_token};

/// Sem segredo configurado -> 500; segredo diferente ou ausente -> 401.
pub(crate) fn check_intake_token(configured: Option<&str>, provided: Option<&str>) -> Result<(), AppError> {
    let secret = configured.ok_or(AppError::IntakeMisconfigured)?;
    let provided = provided.ok_or(AppError::InvalidToken)?;

    if bool::from(provided.as_bytes().ct_eq(secret.as_bytes())) {
        Ok(())
    } else {
        Err(AppError::InvalidToken)
    }
}

pub async fn intake_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = bearer_token(request.headers());

    if let Err(err) = check_intake_token(app_state.config.intake_token.as_deref(), provided.as_deref()) {
        if matches!(err, AppError::InvalidToken) {
            tracing::warn!("Ingestão rejeitada: token inválido");
        }
        return Err(err);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_secret_is_a_server_error() {
        assert!(matches!(
            check_intake_token(None, Some("qualquer")),
            Err(AppError::IntakeMisconfigured)
        ));
    }

    #[test]
    fn mismatched_or_missing_token_is_unauthorized() {
        assert!(matches!(check_intake_token(Some("s3cr3t"), Some("s3cr3")), Err(AppError::InvalidToken)));
        assert!(matches!(check_intake_token(Some("s3cr3t"), Some("S3CR3T")), Err(AppError::InvalidToken)));
        assert!(matches!(check_intake_token(Some("s3cr3t"), None), Err(AppError::InvalidToken)));
    }

    #[test]
    fn exact_token_passes() {
        assert!(check_intake_token(Some("s3cr3t"), Some("s3cr3t")).is_ok());
    }
}
