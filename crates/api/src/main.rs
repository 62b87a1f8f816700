use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sharayeh_api::background::mirror_sync;
use sharayeh_api::config::ServerConfig;
use sharayeh_api::router::build_app_router;
use sharayeh_api::state::AppState;
use sharayeh_kernel::api::KernelApi;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Connect timeout for kernel requests.
const KERNEL_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharayeh_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        kernel = %config.site.kernel_base_url,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sharayeh_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    sharayeh_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    sharayeh_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Kernel client ---
    let http = reqwest::Client::builder()
        .connect_timeout(KERNEL_CONNECT_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");
    let kernel = Arc::new(KernelApi::with_client(
        http,
        config.site.kernel_base_url.clone(),
        config.site.kernel_api_key.clone(),
    ));

    // --- Background mirror sync ---
    let shutdown = CancellationToken::new();
    let sync_handle = match config.site.mirror_sync_interval_secs {
        0 => {
            tracing::info!("Mirror sync disabled");
            None
        }
        secs => Some(tokio::spawn(mirror_sync::run(
            pool.clone(),
            Arc::clone(&kernel),
            Duration::from_secs(secs),
            shutdown.clone(),
        ))),
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        kernel,
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stops the mirror sync and any job trackers still polling.
    shutdown.cancel();
    if let Some(handle) = sync_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Mirror sync stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
