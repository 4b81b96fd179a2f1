// src/db/call_report_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Executor, PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::push_search,
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::CompanyScope,
    models::call_report::{CallReport, CallReportFilters, CallReportRow, CallReportState},
};

const ROW_COLUMNS: &str = "\
    cr.id, cr.company_id, cr.customer_id, cr.summary, cr.conversation, cr.metadata, \
    cr.state, cr.created_at, cr.updated_at, \
    cu.phone AS customer_phone, cu.name AS customer_name, cu.lastname AS customer_lastname, \
    cu.email AS customer_email, cu.created_at AS customer_created_at, cu.updated_at AS customer_updated_at, \
    co.name AS company_name, co.created_at AS company_created_at, co.updated_at AS company_updated_at";

const ROW_FROM: &str = "\
    FROM call_reports cr \
    JOIN customers cu ON cu.id = cr.customer_id \
    JOIN companies co ON co.id = cr.company_id";

/// Campos de um relatório novo. `created_at = None` usa o relógio do banco.
#[derive(Debug, Clone, Copy)]
pub struct NewCallReport<'a> {
    pub company_id: i64,
    pub customer_id: i64,
    pub summary: &'a str,
    pub conversation: &'a Value,
    pub metadata: Option<&'a Value>,
    pub state: CallReportState,
    pub created_at: Option<DateTime<Utc>>,
}

/// SELECT (ou COUNT) da listagem, já com escopo de empresa e filtros.
pub(crate) fn call_report_list_query<'a>(
    select: &str,
    scope: CompanyScope,
    filters: &CallReportFilters,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} {} WHERE TRUE", select, ROW_FROM));

    match scope {
        CompanyScope::Unrestricted => {}
        CompanyScope::Only(company_id) => {
            qb.push(" AND cr.company_id = ").push_bind(company_id);
        }
        CompanyScope::Nothing => {
            qb.push(" AND FALSE");
        }
    }

    if let Some(state) = filters.state {
        qb.push(" AND cr.state = ").push_bind(state);
    }

    // Datas inclusivas: compara só o dia (UTC) de criação
    if let Some(from) = filters.date_from {
        qb.push(" AND (cr.created_at AT TIME ZONE 'UTC')::date >= ").push_bind(from);
    }
    if let Some(to) = filters.date_to {
        qb.push(" AND (cr.created_at AT TIME ZONE 'UTC')::date <= ").push_bind(to);
    }

    if let Some(term) = filters.search.as_deref() {
        push_search(
            &mut qb,
            &["cr.summary", "cu.phone", "cu.name", "cu.lastname", "cu.email"],
            term,
        );
    }

    qb
}

#[derive(Clone)]
pub struct CallReportRepository {
    pool: PgPool,
}

impl CallReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: CompanyScope,
        filters: &CallReportFilters,
        request: PageRequest,
    ) -> Result<Page<CallReportRow>, AppError> {
        let total: i64 = call_report_list_query("COUNT(*)", scope, filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = call_report_list_query(ROW_COLUMNS, scope, filters);
        qb.push(" ORDER BY cr.created_at DESC, cr.id DESC LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = qb.build_query_as::<CallReportRow>().fetch_all(&self.pool).await?;

        Ok(Page { items, total, request })
    }

    pub async fn find_row(&self, id: i64) -> Result<Option<CallReportRow>, AppError> {
        let row = sqlx::query_as::<_, CallReportRow>(&format!(
            "SELECT {} {} WHERE cr.id = $1",
            ROW_COLUMNS, ROW_FROM
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create(&self, conn: &mut PgConnection, new: NewCallReport<'_>) -> Result<CallReport, AppError> {
        let report = sqlx::query_as::<_, CallReport>(
            r#"
            INSERT INTO call_reports (company_id, customer_id, summary, conversation, metadata, state, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING id, company_id, customer_id, summary, conversation, metadata, state, created_at, updated_at
            "#,
        )
        .bind(new.company_id)
        .bind(new.customer_id)
        .bind(new.summary)
        .bind(new.conversation)
        .bind(new.metadata)
        .bind(new.state)
        .bind(new.created_at)
        .fetch_one(conn)
        .await?;

        Ok(report)
    }

    pub async fn attach_service_types<'e, E>(
        &self,
        executor: E,
        call_report_id: i64,
        service_type_ids: &[i64],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO call_report_service_type (call_report_id, service_type_id)
            SELECT $1, unnest($2::bigint[])
            ON CONFLICT (call_report_id, service_type_id) DO NOTHING
            "#,
        )
        .bind(call_report_id)
        .bind(service_type_ids)
        .execute(executor)
        .await?;

        Ok(())
    }
}
