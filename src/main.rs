// src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use callhub_backend::{
    config::{AppState, Config},
    routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG controla o nível (padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    if config.intake_token.is_none() {
        tracing::warn!("INTAKE_TOKEN não definido: a ingestão de relatórios responderá 500");
    }

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(seed) = &app_state.config.super_admin {
        app_state
            .auth_service
            .bootstrap_super_admin(&seed.name, &seed.email, &seed.password)
            .await
            .context("Falha ao criar o Super-Admin inicial")?;
    }

    let listener = TcpListener::bind(&app_state.config.bind_addr)
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, routes::app(app_state))
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
