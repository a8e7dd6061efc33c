mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use creatordb_modash::ModashClient;
use creatordb_search::{
    CoordinatorConfig, PgCooldownStore, PgCreatorStore, RateLimitSentinel, SearchCoordinator,
};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

/// The concrete coordinator wired up by this binary.
pub type AppCoordinator = SearchCoordinator<PgCreatorStore, ModashClient, PgCooldownStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(creatordb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = creatordb_db::PoolConfig::from_app_config(&config);
    let pool = creatordb_db::connect_pool(&config.database_url, pool_config).await?;
    creatordb_db::run_migrations(&pool).await?;

    let token = config.modash_api_token.clone().unwrap_or_default();
    if token.is_empty() {
        tracing::warn!("MODASH_API_TOKEN not set; remote provider calls will be rejected");
    }
    let provider = match &config.modash_base_url {
        Some(base) => ModashClient::with_base_url(&token, config.provider_request_timeout_secs, base)?,
        None => ModashClient::new(&token, config.provider_request_timeout_secs)?,
    };

    let sentinel = RateLimitSentinel::new(
        PgCooldownStore::new(pool.clone()),
        creatordb_modash::PROVIDER_NAME,
        config.provider_cooldown_secs,
    );
    let coordinator = Arc::new(SearchCoordinator::new(
        PgCreatorStore::new(pool.clone()),
        provider,
        sentinel,
        CoordinatorConfig::from_app_config(&config),
    ));

    let auth = AuthState::from_env(matches!(
        config.env,
        creatordb_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, coordinator }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "creatordb server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
