use appetized::{
    build_router,
    recipe::{InMemoryRecipeRepository, PostgresRecipeRepository},
    user::{InMemoryUserRepository, PostgresUserRepository},
    verification::{InMemoryVerificationRepository, LogMailer, PostgresVerificationRepository},
    AppConfig, AppError, AppState,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appetized=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        environment = %config.environment,
        policy = %config.invalidation_policy,
        "Starting Appetized API"
    );

    let bind_addr = config.bind_addr.clone();
    let mailer = Arc::new(LogMailer);

    // Postgres when DATABASE_URL is set, in-memory stores otherwise
    let app_state = match config.database_url.clone() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&database_url)
                .await?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
            info!("Connected to PostgreSQL and applied migrations");

            AppState::new(
                config,
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresRecipeRepository::new(pool.clone())),
                Arc::new(PostgresVerificationRepository::new(pool)),
                mailer,
            )
        }
        None => {
            warn!("DATABASE_URL not set, data lives in memory and is lost on restart");
            AppState::new(
                config,
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryRecipeRepository::new()),
                Arc::new(InMemoryVerificationRepository::new()),
                mailer,
            )
        }
    };

    let app = build_router(app_state)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("Cannot bind {}: {}", bind_addr, e)))?;
    info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            AppError::Internal
        })?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
