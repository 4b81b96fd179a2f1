// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CallReportRepository, CompanyRepository, CustomerRepository, RbacRepository, ServiceTypeRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, CallReportService, CompanyService, CustomerService, RbacService, ServiceTypeService,
        UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Credenciais do Super-Admin criado na inicialização, se ainda não existir.
#[derive(Clone)]
pub struct SuperAdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Configuração lida do ambiente (e do `.env`, se houver).
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Segredo da automação de ingestão. Sem ele a rota responde 500.
    pub intake_token: Option<String>,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub token_ttl: chrono::Duration,
    pub super_admin: Option<SuperAdminSeed>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de consulta. Valores
    /// vazios contam como ausentes.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().context("DATABASE_MAX_CONNECTIONS inválido")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let token_ttl_days: i64 = match get("TOKEN_TTL_DAYS") {
            Some(raw) => raw.parse::<i64>().context("TOKEN_TTL_DAYS inválido")?,
            None => DEFAULT_TOKEN_TTL_DAYS,
        };
        anyhow::ensure!(token_ttl_days > 0, "TOKEN_TTL_DAYS deve ser positivo");

        let super_admin = match (get("SUPER_ADMIN_EMAIL"), get("SUPER_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperAdminSeed {
                name: get("SUPER_ADMIN_NAME").unwrap_or_else(|| "Super Admin".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            intake_token: get("INTAKE_TOKEN"),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_max_connections,
            token_ttl: chrono::Duration::days(token_ttl_days),
            super_admin,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub rbac_service: RbacService,
    pub company_service: CompanyService,
    pub customer_service: CustomerService,
    pub service_type_service: ServiceTypeService,
    pub call_report_service: CallReportService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o grafo de dependências sobre um pool já existente.
    pub fn from_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let service_type_repo = ServiceTypeRepository::new(db_pool.clone());
        let call_report_repo = CallReportRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            rbac_repo.clone(),
            config.jwt_secret.clone(),
            config.token_ttl,
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo, rbac_repo.clone(), company_repo.clone(), db_pool.clone());
        let rbac_service = RbacService::new(rbac_repo);
        let company_service = CompanyService::new(company_repo.clone(), service_type_repo.clone());
        let customer_service = CustomerService::new(customer_repo.clone(), company_repo.clone(), db_pool.clone());
        let service_type_service = ServiceTypeService::new(service_type_repo.clone(), company_repo.clone());
        let call_report_service = CallReportService::new(
            call_report_repo,
            customer_repo,
            company_repo,
            service_type_repo,
            db_pool.clone(),
        );

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            user_service,
            rbac_service,
            company_service,
            customer_service,
            service_type_service,
            call_report_service,
        }
    }
}
