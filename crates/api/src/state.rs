use std::sync::Arc;

use sharayeh_kernel::api::KernelApi;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sharayeh_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Agentic Kernel client (shares one `reqwest::Client`).
    pub kernel: Arc<KernelApi>,
    /// Cancelled at shutdown; job trackers spawned by handlers watch it.
    pub shutdown: CancellationToken,
}
