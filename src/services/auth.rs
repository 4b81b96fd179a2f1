// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, RbacRepository, UserRepository},
    models::auth::{Caller, Claims, LoginUserPayload, User, SUPER_ADMIN_ROLE},
};

const TOKEN_NAME: &str = "api-token";

/// Resultado de um token válido: quem é, o que pode, e qual token usou.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub caller: Caller,
    pub token_id: Uuid,
}

// Hash em thread separada: bcrypt é CPU-bound
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    rbac_repo: RbacRepository,
    jwt_secret: String,
    token_ttl: Duration,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        rbac_repo: RbacRepository,
        jwt_secret: String,
        token_ttl: Duration,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, rbac_repo, jwt_secret, token_ttl, pool }
    }

    /// Login por e-mail OU celular. Credencial errada e usuário inexistente
    /// produzem o mesmo erro.
    pub async fn login_user(&self, payload: &LoginUserPayload) -> Result<(String, User), AppError> {
        let email = payload.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let mobile = payload.mobile.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let user = match (email, mobile) {
            (Some(email), _) => self.user_repo.find_by_email(email).await?,
            (None, Some(mobile)) => self.user_repo.find_by_mobile(mobile).await?,
            (None, None) => None,
        }
        .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&payload.password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(user.id).await?;
        tracing::info!(user_id = user.id, "Login realizado");

        Ok((token, user))
    }

    /// Decodifica o JWT, confere se o token ainda existe no banco e monta o `Caller`.
    pub async fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let claims = self.decode_claims(token)?;

        self.user_repo
            .touch_active_token(claims.jti, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        let caller = self.caller_for(&user).await?;

        Ok(Session { user, caller, token_id: claims.jti })
    }

    pub async fn logout(&self, token_id: Uuid) -> Result<(), AppError> {
        self.user_repo.delete_token(token_id).await?;
        Ok(())
    }

    /// Fotografia de cargos e permissões efetivas do usuário.
    pub async fn caller_for(&self, user: &User) -> Result<Caller, AppError> {
        let roles = self.rbac_repo.user_role_names(user.id).await?;
        let permissions = self.rbac_repo.user_effective_permission_names(user.id).await?;

        Ok(Caller {
            user_id: user.id,
            company_id: user.company_id,
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        })
    }

    /// Garante um Super-Admin inicial. Não faz nada se o e-mail já existe.
    pub async fn bootstrap_super_admin(&self, name: &str, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let role = self
            .rbac_repo
            .find_role_by_name(SUPER_ADMIN_ROLE)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Cargo {} ausente; as migrações rodaram?", SUPER_ADMIN_ROLE))?;

        let password_hash = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create(
                &mut *tx,
                NewUser { name, email, mobile: None, password_hash: &password_hash, company_id: None },
            )
            .await?;
        self.rbac_repo.sync_user_roles(&mut *tx, user.id, &[role.id]).await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, "Super-Admin inicial criado");
        Ok(())
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    async fn issue_token(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;
        let jti = Uuid::new_v4();

        self.user_repo.create_token(jti, user_id, TOKEN_NAME, expires_at).await?;

        let claims = Claims {
            sub: user_id,
            jti,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/callhub_unused")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            RbacRepository::new(pool.clone()),
            secret.to_string(),
            Duration::days(7),
            pool,
        )
    }

    fn sign(secret: &str, exp_offset: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: 42,
            jti: Uuid::new_v4(),
            exp: (now + exp_offset).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[tokio::test]
    async fn claims_round_trip_with_the_same_secret() {
        let claims = service("segredo").decode_claims(&sign("segredo", Duration::hours(1))).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[tokio::test]
    async fn foreign_expired_or_garbage_tokens_are_rejected() {
        let auth = service("segredo");

        assert!(matches!(
            auth.decode_claims(&sign("outro-segredo", Duration::hours(1))),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            auth.decode_claims(&sign("segredo", Duration::hours(-2))),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(auth.decode_claims("nao.e.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn hashed_passwords_verify() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
