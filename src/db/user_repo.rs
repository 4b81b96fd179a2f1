// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{map_unique_violation, UniqueField},
        error::AppError,
        pagination::{Page, PageRequest},
    },
    models::auth::{PersonalAccessToken, User},
};

const USER_COLUMNS: &str = "id, name, email, mobile, password_hash, company_id, created_at, updated_at";

const USER_UNIQUE: &[UniqueField] = &[
    ("users_email_key", "email", "Este e-mail já está em uso."),
    ("users_mobile_key", "mobile", "Este celular já está em uso."),
];

#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub mobile: Option<&'a str>,
    pub password_hash: &'a str,
    pub company_id: Option<i64>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UserChanges<'a> {
    pub name: Option<&'a str>,
    /// `Some(None)` remove o vínculo com a empresa.
    pub company_id: Option<Option<i64>>,
}

// O repositório de usuários e dos tokens emitidos para eles
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo celular (login alternativo)
    pub async fn find_by_mobile(&self, mobile: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE mobile = $1", USER_COLUMNS))
            .bind(mobile)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<User>, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, request })
    }

    // Cria um novo usuário. E-mail/celular duplicados viram 422 no campo certo.
    pub async fn create<'e, E>(&self, executor: E, new: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, mobile, password_hash, company_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, mobile, password_hash, company_id, created_at, updated_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.mobile)
        .bind(new.password_hash)
        .bind(new.company_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, USER_UNIQUE))
    }

    pub async fn update<'e, E>(&self, executor: E, id: i64, changes: UserChanges<'_>) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Executor genérico: o SQL precisa ser 'static
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                company_id = CASE WHEN $3 THEN $4 ELSE company_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, mobile, password_hash, company_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.company_id.is_some())
        .bind(changes.company_id.flatten())
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---
    // Tokens de acesso (um por login; o logout apaga a linha)
    // ---

    pub async fn create_token(
        &self,
        id: Uuid,
        user_id: i64,
        name: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PersonalAccessToken, AppError> {
        let token = sqlx::query_as::<_, PersonalAccessToken>(
            r#"
            INSERT INTO personal_access_tokens (id, user_id, name, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, last_used_at, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Token ainda válido (existe, é do usuário e não expirou). Marca o último uso.
    pub async fn touch_active_token(&self, id: Uuid, user_id: i64) -> Result<Option<PersonalAccessToken>, AppError> {
        let token = sqlx::query_as::<_, PersonalAccessToken>(
            r#"
            UPDATE personal_access_tokens
            SET last_used_at = NOW()
            WHERE id = $1 AND user_id = $2 AND expires_at > NOW()
            RETURNING id, user_id, name, last_used_at, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn delete_token(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
