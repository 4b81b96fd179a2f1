// src/db/service_type_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, UniqueField},
        error::AppError,
        pagination::{Page, PageRequest},
    },
    models::service_type::ServiceType,
};

const SERVICE_TYPE_UNIQUE: &[UniqueField] = &[(
    "service_types_company_id_name_key",
    "name",
    "Esta empresa já possui um tipo de serviço com esse nome.",
)];

#[derive(Clone)]
pub struct ServiceTypeRepository {
    pool: PgPool,
}

impl ServiceTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_company(&self, company_id: i64, request: PageRequest) -> Result<Page<ServiceType>, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_types WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, ServiceType>(
            r#"
            SELECT id, company_id, name, created_at, updated_at
            FROM service_types
            WHERE company_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(company_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, request })
    }

    /// Todos os tipos das empresas informadas, em ordem alfabética.
    pub async fn list_for_companies(&self, company_ids: &[i64]) -> Result<Vec<ServiceType>, AppError> {
        let items = sqlx::query_as::<_, ServiceType>(
            r#"
            SELECT id, company_id, name, created_at, updated_at
            FROM service_types
            WHERE company_id = ANY($1)
            ORDER BY name, id
            "#,
        )
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn list_for_report(&self, call_report_id: i64) -> Result<Vec<ServiceType>, AppError> {
        let items = sqlx::query_as::<_, ServiceType>(
            r#"
            SELECT st.id, st.company_id, st.name, st.created_at, st.updated_at
            FROM service_types st
            JOIN call_report_service_type crst ON crst.service_type_id = st.id
            WHERE crst.call_report_id = $1
            ORDER BY st.name, st.id
            "#,
        )
        .bind(call_report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ServiceType>, AppError> {
        let service_type = sqlx::query_as::<_, ServiceType>(
            "SELECT id, company_id, name, created_at, updated_at FROM service_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service_type)
    }

    /// Ids de `ids` que NÃO pertencem à empresa (inexistentes ou de outra empresa).
    pub async fn foreign_ids<'e, E>(&self, executor: E, company_id: i64, ids: &[i64]) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let foreign: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT wanted.id
            FROM unnest($2::bigint[]) AS wanted(id)
            WHERE NOT EXISTS (
                SELECT 1 FROM service_types st
                WHERE st.id = wanted.id AND st.company_id = $1
            )
            "#,
        )
        .bind(company_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(foreign)
    }

    pub async fn create(&self, company_id: i64, name: &str) -> Result<ServiceType, AppError> {
        sqlx::query_as::<_, ServiceType>(
            r#"
            INSERT INTO service_types (company_id, name)
            VALUES ($1, $2)
            RETURNING id, company_id, name, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, SERVICE_TYPE_UNIQUE))
    }

    pub async fn update(&self, id: i64, name: Option<&str>) -> Result<Option<ServiceType>, AppError> {
        sqlx::query_as::<_, ServiceType>(
            r#"
            UPDATE service_types
            SET name = COALESCE($2, name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, company_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, SERVICE_TYPE_UNIQUE))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM service_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
