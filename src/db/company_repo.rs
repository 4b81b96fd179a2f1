// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, UniqueField},
        error::AppError,
        pagination::{Page, PageRequest},
    },
    models::company::{Company, CompanySummary},
};

const COMPANY_UNIQUE: &[UniqueField] = &[(
    "companies_name_key",
    "name",
    "Já existe uma empresa com esse nome.",
)];

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Company>, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM companies
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, request })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, created_at, updated_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    /// Ids (dentre `ids`) que não existem. Usado para validar listas enviadas pelo cliente.
    pub async fn missing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let missing: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT wanted.id
            FROM unnest($1::bigint[]) AS wanted(id)
            WHERE NOT EXISTS (SELECT 1 FROM companies c WHERE c.id = wanted.id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(missing)
    }

    pub async fn summary(&self, id: i64) -> Result<Option<CompanySummary>, AppError> {
        let summary = sqlx::query_as::<_, CompanySummary>("SELECT id, name FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(summary)
    }

    pub async fn create(&self, name: &str) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, COMPANY_UNIQUE))
    }

    /// Atualização parcial: `None` mantém o valor atual.
    pub async fn update(&self, id: i64, name: Option<&str>) -> Result<Option<Company>, AppError> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = COALESCE($2, name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, COMPANY_UNIQUE))
    }

    /// Devolve `false` se a empresa não existia.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
