use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use onboard_core::memory::{MemoryAccountStore, MemoryOnboardingStore};
use onboard_core::store::{AccountStore, OnboardingStore};
use onboard_db::store::{PgAccountStore, PgOnboardingStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onboard_api::config::{LogFormat, ServerConfig};
use onboard_api::router::build_app_router;
use onboard_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Stores ---
    let (onboarding_store, accounts) = build_stores(&config).await?;

    // --- App state / router ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let state = AppState::new(config, onboarding_store, accounts);
    tracing::info!(
        allow_edits_after_completion = state.onboarding.policy().allows_edits_after_completion(),
        "Onboarding edit policy"
    );
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "onboard_api=debug,onboard_core=debug,onboard_db=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Connect to Postgres when `DATABASE_URL` is set, otherwise fall back to
/// process-local memory stores.
async fn build_stores(
    config: &ServerConfig,
) -> anyhow::Result<(Arc<dyn OnboardingStore>, Arc<dyn AccountStore>)> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
        return Ok((
            Arc::new(MemoryOnboardingStore::new()),
            Arc::new(MemoryAccountStore::new()),
        ));
    };

    let pool = onboard_db::create_pool(database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    onboard_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    onboard_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok((
        Arc::new(PgOnboardingStore::new(pool.clone())),
        Arc::new(PgAccountStore::new(pool)),
    ))
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
