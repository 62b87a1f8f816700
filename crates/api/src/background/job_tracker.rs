//! Server-side tracking of submitted slides jobs.
//!
//! After a slides job is accepted, a tracker polls its artifacts until they
//! are ready (or polling gives up) and copies the result into the
//! presentation mirror. Trackers stop at server shutdown.

use sharayeh_kernel::poller::{ExportsPoller, PollConfig, TIMED_OUT_MESSAGE};

use crate::mirror::{self, Owner};
use crate::state::AppState;

/// Polls before a tracker gives up (30 minutes at the default interval).
pub const MAX_TRACKED_POLLS: u32 = 900;

/// Spawn a tracker for `job_id`. Returns immediately.
pub fn spawn(state: &AppState, job_id: String, plan_id: Option<String>, owner: Owner) {
    let pool = state.pool.clone();
    let kernel = state.kernel.clone();
    let shutdown = state.shutdown.clone();
    let config = PollConfig {
        max_polls: Some(MAX_TRACKED_POLLS),
        ..PollConfig::with_interval_ms(state.config.site.job_poll_interval_ms)
    };

    tokio::spawn(async move {
        let mut handle = ExportsPoller::watch(kernel, job_id.clone(), config);

        let snapshot = tokio::select! {
            _ = shutdown.cancelled() => None,
            snapshot = handle.wait() => Some(snapshot),
        };
        let Some(snapshot) = snapshot else {
            tracing::debug!(job_id = %job_id, "Job tracker stopped by shutdown");
            return;
        };

        if snapshot.error.as_deref() == Some(TIMED_OUT_MESSAGE) {
            tracing::warn!(job_id = %job_id, "Job tracker gave up waiting for artifacts");
        }

        let Some(artifacts) = snapshot.artifacts else {
            return;
        };
        let Some(plan_id) = snapshot
            .plan_id
            .or_else(|| artifacts.plan_id.clone())
            .or(plan_id)
        else {
            tracing::debug!(job_id = %job_id, "No plan id known, mirror not updated");
            return;
        };

        match mirror::record_artifacts(&pool, &job_id, &plan_id, owner, &artifacts).await {
            Ok(row) => {
                tracing::info!(
                    job_id = %job_id,
                    plan_id = %plan_id,
                    status = %row.status,
                    "Job tracker recorded artifacts"
                );
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Job tracker mirror write failed");
            }
        }
    });
}
