// src/db/customer_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_unique_violation, push_search, UniqueField},
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::CompanyScope,
    models::customer::Customer,
};

const CUSTOMER_COLUMNS: &str = "c.id, c.phone, c.name, c.lastname, c.email, c.created_at, c.updated_at";

const CUSTOMER_UNIQUE: &[UniqueField] = &[
    ("customers_phone_key", "phone", "Este telefone já está em uso."),
    ("customers_email_key", "email", "Este e-mail já está em uso."),
];

// Na ingestão os erros aparecem sob "profile.*"
const PROFILE_UNIQUE: &[UniqueField] = &[
    ("customers_email_key", "profile.email", "Este e-mail já pertence a outro cliente."),
];

/// Dados para criar um cliente (tela ou ingestão).
#[derive(Debug, Clone, Copy)]
pub struct NewCustomer<'a> {
    pub phone: &'a str,
    pub name: &'a str,
    pub lastname: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Mudanças parciais. Nos campos anuláveis, `Some(None)` grava NULL.
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomerChanges<'a> {
    pub name: Option<&'a str>,
    pub lastname: Option<Option<&'a str>>,
    pub phone: Option<&'a str>,
    pub email: Option<Option<&'a str>>,
}

/// Monta o SELECT (ou COUNT) da listagem com escopo de empresa e busca.
pub(crate) fn customer_list_query<'a>(
    select: &str,
    scope: CompanyScope,
    search: Option<&str>,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM customers c WHERE TRUE", select));

    match scope {
        CompanyScope::Unrestricted => {}
        CompanyScope::Only(company_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM customer_company cc \
                 WHERE cc.customer_id = c.id AND cc.company_id = ",
            )
            .push_bind(company_id)
            .push(")");
        }
        CompanyScope::Nothing => {
            qb.push(" AND FALSE");
        }
    }

    if let Some(term) = search {
        push_search(&mut qb, &["c.name", "c.lastname", "c.phone", "c.email"], term);
    }

    qb
}

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: CompanyScope,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Customer>, AppError> {
        let total: i64 = customer_list_query("COUNT(*)", scope, search)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = customer_list_query(CUSTOMER_COLUMNS, scope, search);
        qb.push(" ORDER BY c.created_at DESC, c.id DESC LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = qb.build_query_as::<Customer>().fetch_all(&self.pool).await?;

        Ok(Page { items, total, request })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, phone, name, lastname, email, created_at, updated_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn create<'e, E>(&self, executor: E, new: NewCustomer<'_>) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (phone, name, lastname, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, phone, name, lastname, email, created_at, updated_at
            "#,
        )
        .bind(new.phone)
        .bind(new.name)
        .bind(new.lastname)
        .bind(new.email)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, CUSTOMER_UNIQUE))
    }

    pub async fn update(&self, id: i64, changes: CustomerChanges<'_>) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                lastname = CASE WHEN $4 THEN $5 ELSE lastname END,
                email = CASE WHEN $6 THEN $7 ELSE email END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, phone, name, lastname, email, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.phone)
        .bind(changes.lastname.is_some())
        .bind(changes.lastname.flatten())
        .bind(changes.email.is_some())
        .bind(changes.email.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, CUSTOMER_UNIQUE))
    }

    /// Remove a linha (vínculos e relatórios vão junto por cascata).
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Busca pelo telefone ou cria. O INSERT é protegido pela UNIQUE do
    /// telefone: se outra transação criou o mesmo cliente entre a nossa
    /// tentativa e agora, o `DO NOTHING` cede e o SELECT encontra a linha dela.
    pub async fn find_or_create_by_phone(
        &self,
        conn: &mut PgConnection,
        new: NewCustomer<'_>,
    ) -> Result<(Customer, bool), AppError> {
        let inserted = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (phone, name, lastname, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone) DO NOTHING
            RETURNING id, phone, name, lastname, email, created_at, updated_at
            "#,
        )
        .bind(new.phone)
        .bind(new.name)
        .bind(new.lastname)
        .bind(new.email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, PROFILE_UNIQUE))?;

        if let Some(customer) = inserted {
            return Ok((customer, true));
        }

        let existing = sqlx::query_as::<_, Customer>(
            "SELECT id, phone, name, lastname, email, created_at, updated_at FROM customers WHERE phone = $1",
        )
        .bind(new.phone)
        .fetch_one(&mut *conn)
        .await?;

        Ok((existing, false))
    }

    /// Idempotente: vincular duas vezes não duplica o pivô.
    pub async fn attach<'e, E>(&self, executor: E, customer_id: i64, company_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO customer_company (customer_id, company_id)
            VALUES ($1, $2)
            ON CONFLICT (customer_id, company_id) DO NOTHING
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn attach_many<'e, E>(
        &self,
        executor: E,
        customer_id: i64,
        company_ids: &[i64],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO customer_company (customer_id, company_id)
            SELECT $1, unnest($2::bigint[])
            ON CONFLICT (customer_id, company_id) DO NOTHING
            "#,
        )
        .bind(customer_id)
        .bind(company_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn detach(&self, customer_id: i64, company_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customer_company WHERE customer_id = $1 AND company_id = $2")
            .bind(customer_id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empresas às quais o cliente está vinculado.
    pub async fn company_ids(&self, customer_id: i64) -> Result<Vec<i64>, AppError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT company_id FROM customer_company WHERE customer_id = $1 ORDER BY company_id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_listing_filters_through_the_pivot() {
        let qb = customer_list_query("COUNT(*)", CompanyScope::Only(7), None);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM customers c WHERE TRUE AND EXISTS (SELECT 1 FROM customer_company cc \
             WHERE cc.customer_id = c.id AND cc.company_id = $1)"
        );
    }

    #[test]
    fn unrestricted_listing_has_no_company_clause() {
        let qb = customer_list_query("c.id", CompanyScope::Unrestricted, None);
        assert_eq!(qb.sql(), "SELECT c.id FROM customers c WHERE TRUE");
    }

    #[test]
    fn caller_without_company_sees_nothing() {
        let qb = customer_list_query("c.id", CompanyScope::Nothing, Some("ana"));
        assert!(qb.sql().contains(" AND FALSE"));
    }

    #[test]
    fn search_covers_name_phone_and_email() {
        let qb = customer_list_query("c.id", CompanyScope::Only(1), Some("ana"));
        let sql = qb.sql();
        assert!(sql.ends_with(
            "AND (c.name ILIKE $2 OR c.lastname ILIKE $3 OR c.phone ILIKE $4 OR c.email ILIKE $5)"
        ));
    }
}
