use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pl_stats_api::config::Config;
use pl_stats_api::db;
use pl_stats_api::routes::{self, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting api server...");

    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Database connection established.");

    let app = routes::router(AppState {
        pool: pool.clone(),
        response_shape: config.response_shape,
    });

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.close().await;
    tracing::info!("Database connection closed.");

    served.expect("Failed to start server.");
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::warn!("Ctrl+C received, starting graceful shutdown");
        },
        () = terminate => {
            tracing::warn!("SIGTERM received, starting graceful shutdown");
        },
    }
}
