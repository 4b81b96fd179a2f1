// Utilitários compartilhados pelos testes de integração.
//
// Cada teste recebe um banco novo do `#[sqlx::test]`, já com as migrações.

#![allow(dead_code)]

use std::collections::BTreeSet;

use callhub_backend::{
    config::{AppState, Config},
    models::auth::{Caller, SUPER_ADMIN_ROLE},
    services::policy::perms,
};
use serde_json::Value;
use sqlx::PgPool;

pub fn state(pool: PgPool) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://nao-usado".into()),
        "JWT_SECRET" => Some("segredo-de-teste".into()),
        "INTAKE_TOKEN" => Some("s3cr3t".into()),
        _ => None,
    })
    .expect("config de teste");

    AppState::from_pool(pool, config)
}

pub fn super_admin() -> Caller {
    Caller {
        user_id: 1,
        company_id: None,
        roles: BTreeSet::from([SUPER_ADMIN_ROLE.to_string()]),
        permissions: BTreeSet::new(),
    }
}

/// Admin da empresa, com as permissões padrão do cargo.
pub fn admin_of(company_id: i64) -> Caller {
    Caller {
        user_id: 2,
        company_id: Some(company_id),
        roles: BTreeSet::from(["Admin".to_string()]),
        permissions: [perms::SEE_USERS, perms::MANAGE_SERVICE_TYPES, perms::SEE_CALL_REPORTS]
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

pub async fn create_company(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO companies (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("empresa de teste")
}

pub async fn create_service_type(pool: &PgPool, company_id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO service_types (company_id, name) VALUES ($1, $2) RETURNING id")
        .bind(company_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("tipo de serviço de teste")
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("contagem")
}

pub fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("payload de teste")
}
