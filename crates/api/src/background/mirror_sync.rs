//! Periodic refresh of non-terminal presentation mirrors.
//!
//! Each tick loads up to [`SYNC_BATCH_SIZE`] mirrors whose status is not
//! terminal, oldest sync first, and refreshes each from the kernel. Rows are
//! synced one by one; a failure is logged and the next row is tried.

use std::sync::Arc;
use std::time::Duration;

use sharayeh_core::mirror_status::MirrorStatus;
use sharayeh_db::repositories::PresentationMirrorRepo;
use sharayeh_db::DbPool;
use sharayeh_kernel::api::KernelApi;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::mirror;

/// Most mirrors refreshed per tick.
pub const SYNC_BATCH_SIZE: i64 = 50;

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: usize,
    pub failed: usize,
}

/// Run one pass over the stale mirrors.
pub async fn sync_once(pool: &DbPool, kernel: &KernelApi) -> SyncSummary {
    let statuses: Vec<String> = MirrorStatus::non_terminal()
        .into_iter()
        .map(str::to_string)
        .collect();

    let stale = match PresentationMirrorRepo::list_stale(pool, &statuses, SYNC_BATCH_SIZE).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Mirror sync: failed to load stale mirrors");
            return SyncSummary::default();
        }
    };

    let mut summary = SyncSummary::default();
    for row in stale {
        match mirror::sync_presentation(pool, kernel, &row.plan_id).await {
            Ok(_) => summary.synced += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(plan_id = %row.plan_id, error = %e, "Mirror sync: row failed");
            }
        }
    }
    summary
}

/// Run the mirror sync loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    kernel: Arc<KernelApi>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Mirror sync job started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Mirror sync job stopping");
                break;
            }
            _ = ticker.tick() => {
                let summary = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Mirror sync job stopping mid-pass");
                        break;
                    }
                    summary = sync_once(&pool, &kernel) => summary,
                };
                if summary.synced + summary.failed > 0 {
                    tracing::info!(
                        synced = summary.synced,
                        failed = summary.failed,
                        "Mirror sync: pass complete"
                    );
                } else {
                    tracing::debug!("Mirror sync: nothing to refresh");
                }
            }
        }
    }
}
