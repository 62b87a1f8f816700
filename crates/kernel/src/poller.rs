//! Job polling clients.
//!
//! [`SlidesJob::start`] submits a slide generation job and tracks it;
//! [`ExportsPoller::watch`] tracks a job that already exists. Both return a
//! [`JobHandle`] whose state is published through a `watch` channel as a
//! [`JobSnapshot`].
//!
//! Polling runs at a fixed interval until the job's artifacts are ready or
//! the handle is cancelled. A failed poll records its error in the snapshot
//! and the next tick tries again; there is no backoff.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use sharayeh_core::artifacts::{extract_ids, JobArtifacts, LogIds};
use sharayeh_core::error::CoreError;
use sharayeh_core::validation::{validate_request, SlidesGenerateRequest};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{KernelApi, KernelApiError};
use crate::events::KernelEvent;

/// Default delay between artifact polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Error recorded when `max_polls` is exhausted.
pub const TIMED_OUT_MESSAGE: &str = "timed out waiting for artifacts";

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Idle,
    Running,
}

/// Client-side view of a tracked job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub status: ClientStatus,
    pub job_id: Option<String>,
    pub plan_id: Option<String>,
    /// Accumulated log text (stream tokens and log lines).
    pub log: String,
    pub artifacts: Option<JobArtifacts>,
    /// Last error, cleared by the next successful poll.
    pub error: Option<String>,
    /// Byte offset in `log` up to which complete lines have been scanned.
    #[serde(skip)]
    scanned: usize,
    #[serde(skip)]
    log_ids: LogIds,
}

impl JobSnapshot {
    pub fn is_running(&self) -> bool {
        self.status == ClientStatus::Running
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.as_ref().is_some_and(JobArtifacts::is_ready)
    }

    fn push_log_line(&mut self, line: &str) {
        self.log.push_str(line);
        if !line.ends_with('\n') {
            self.log.push('\n');
        }
    }

    /// Append a stream token. The log is rescanned only when the token
    /// completes a line.
    fn push_token(&mut self, token: &str) {
        self.log.push_str(token);
        if token.contains('\n') {
            self.refresh_from_log(false);
        }
    }

    /// Scan log text appended since the last scan and fill missing IDs and
    /// links. Only complete lines are consumed; `flush` also reads the
    /// trailing partial line, which is scanned again once it completes.
    fn refresh_from_log(&mut self, flush: bool) {
        let complete = self.log.rfind('\n').map_or(0, |i| i + 1);
        let end = if flush { self.log.len() } else { complete };
        if end > self.scanned {
            self.log_ids.merge(extract_ids(&self.log[self.scanned..end]));
            self.scanned = complete.max(self.scanned);
        }

        if self.job_id.is_none() {
            self.job_id.clone_from(&self.log_ids.job_id);
        }
        if self.plan_id.is_none() {
            self.plan_id.clone_from(&self.log_ids.plan_id);
        }
        if let Some(artifacts) = self.artifacts.as_mut() {
            artifacts.fill_from_log(&self.log_ids);
        }
    }

    /// Merge an artifacts response. `seen` counts the response log lines
    /// already appended, since the kernel reports the full log each time.
    /// Returns whether the job is now ready.
    fn apply_artifacts(&mut self, mut artifacts: JobArtifacts, seen: &mut usize) -> bool {
        let logs = std::mem::take(&mut artifacts.logs);
        if logs.len() > *seen {
            for line in &logs[*seen..] {
                self.push_log_line(line);
            }
            *seen = logs.len();
        }

        if let Some(plan_id) = artifacts.plan_id.as_ref().filter(|p| !p.is_empty()) {
            self.plan_id = Some(plan_id.clone());
        }
        self.artifacts = Some(artifacts);
        self.error = None;
        self.refresh_from_log(true);
        self.is_ready()
    }
}

// ---------------------------------------------------------------------------
// Config and errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    /// Stop with [`TIMED_OUT_MESSAGE`] after this many polls.
    pub max_polls: Option<u32>,
    /// Follow the job's event stream before falling back to polling.
    pub stream: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            stream: false,
        }
    }
}

impl PollConfig {
    pub fn with_interval_ms(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms.max(1)),
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Failed to start job: {0}")]
    Start(#[from] KernelApiError),
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running tracker. Dropping it stops polling.
#[derive(Debug)]
pub struct JobHandle {
    tx: Arc<watch::Sender<JobSnapshot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl JobHandle {
    fn spawn(
        api: Arc<KernelApi>,
        job_id: String,
        initial: JobSnapshot,
        config: PollConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(initial);
        let tx = Arc::new(tx);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(track(
            api,
            job_id,
            config,
            Arc::clone(&tx),
            cancel.clone(),
        ));

        Self {
            tx,
            cancel,
            task: Some(task),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.tx.borrow().clone()
    }

    /// Stop polling and mark the client idle. The kernel job keeps running.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.tx.send_modify(|s| s.status = ClientStatus::Idle);
    }

    /// Wait for the tracker to finish and return the final snapshot.
    pub async fn wait(&mut self) -> JobSnapshot {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Job tracker task failed");
            }
        }
        self.snapshot()
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Submits slide generation jobs.
pub struct SlidesJob;

impl SlidesJob {
    /// Validate the request, create the job and start tracking it.
    pub async fn start(
        api: Arc<KernelApi>,
        request: &SlidesGenerateRequest,
        config: PollConfig,
    ) -> Result<JobHandle, PollError> {
        validate_request(request)?;
        let created = api.create_slides_job(request).await?;
        tracing::info!(job_id = %created.job_id, "Slides job created");

        let initial = JobSnapshot {
            status: ClientStatus::Running,
            job_id: Some(created.job_id.clone()),
            plan_id: created.plan_id,
            ..JobSnapshot::default()
        };
        Ok(JobHandle::spawn(api, created.job_id, initial, config))
    }
}

/// Tracks the exports of an existing job.
pub struct ExportsPoller;

impl ExportsPoller {
    /// Start polling `job_id`. Must be called inside a tokio runtime.
    pub fn watch(api: Arc<KernelApi>, job_id: impl Into<String>, config: PollConfig) -> JobHandle {
        let job_id = job_id.into();
        let initial = JobSnapshot {
            status: ClientStatus::Running,
            job_id: Some(job_id.clone()),
            ..JobSnapshot::default()
        };
        JobHandle::spawn(api, job_id, initial, config)
    }
}

// ---------------------------------------------------------------------------
// Tracker task
// ---------------------------------------------------------------------------

/// Apply `f` unless the handle was cancelled. The check runs under the
/// channel lock, so a cancel cannot be overwritten by a late update.
fn update(
    tx: &watch::Sender<JobSnapshot>,
    cancel: &CancellationToken,
    f: impl FnOnce(&mut JobSnapshot),
) {
    tx.send_if_modified(|s| {
        if cancel.is_cancelled() {
            return false;
        }
        f(s);
        true
    });
}

async fn track(
    api: Arc<KernelApi>,
    job_id: String,
    config: PollConfig,
    tx: Arc<watch::Sender<JobSnapshot>>,
    cancel: CancellationToken,
) {
    let mut seen = 0usize;

    if config.stream && follow_stream(&api, &job_id, &tx, &cancel, &mut seen).await {
        return;
    }
    poll_until_ready(&api, &job_id, &config, &tx, &cancel, &mut seen).await;
}

/// Consume the event stream. Returns `true` when no polling is needed
/// (artifacts ready or cancelled).
async fn follow_stream(
    api: &KernelApi,
    job_id: &str,
    tx: &watch::Sender<JobSnapshot>,
    cancel: &CancellationToken,
    seen: &mut usize,
) -> bool {
    let opened = tokio::select! {
        _ = cancel.cancelled() => return true,
        opened = api.stream_job(job_id) => opened,
    };
    let stream = match opened {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(job_id, error = %e, "Event stream unavailable, polling instead");
            return false;
        }
    };
    let mut stream = std::pin::pin!(stream);

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return true,
            next = stream.next() => next,
        };

        match next {
            Some(Ok(KernelEvent::Token(token))) => update(tx, cancel, |s| s.push_token(&token)),
            Some(Ok(KernelEvent::Log(line))) => update(tx, cancel, |s| {
                s.push_log_line(&line);
                s.refresh_from_log(false);
            }),
            Some(Ok(KernelEvent::Status(status))) => update(tx, cancel, |s| {
                s.artifacts.get_or_insert_with(JobArtifacts::default).status = Some(status);
            }),
            Some(Ok(KernelEvent::Error(message))) => {
                update(tx, cancel, |s| s.error = Some(message));
            }
            Some(Ok(KernelEvent::Artifacts(artifacts))) => {
                let mut ready = false;
                update(tx, cancel, |s| {
                    ready = s.apply_artifacts(artifacts, seen);
                    if ready {
                        s.status = ClientStatus::Idle;
                    }
                });
                if ready {
                    tracing::info!(job_id, "Artifacts ready from event stream");
                    return true;
                }
            }
            Some(Ok(KernelEvent::Done)) | None => {
                update(tx, cancel, |s| s.refresh_from_log(true));
                return false;
            }
            Some(Err(e)) => {
                tracing::warn!(job_id, error = %e, "Event stream failed, polling instead");
                update(tx, cancel, |s| s.refresh_from_log(true));
                return false;
            }
        }
    }
}

async fn poll_until_ready(
    api: &KernelApi,
    job_id: &str,
    config: &PollConfig,
    tx: &watch::Sender<JobSnapshot>,
    cancel: &CancellationToken,
    seen: &mut usize,
) {
    let start = tokio::time::Instant::now() + config.interval;
    let mut ticker = tokio::time::interval_at(start, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = api.get_artifacts(job_id) => result,
        };
        polls += 1;

        match result {
            Ok(artifacts) => {
                let mut ready = false;
                update(tx, cancel, |s| {
                    ready = s.apply_artifacts(artifacts, seen);
                    if ready {
                        s.status = ClientStatus::Idle;
                    }
                });
                if ready {
                    tracing::info!(job_id, polls, "Artifacts ready");
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(job_id, polls, error = %e, "Artifact poll failed");
                update(tx, cancel, |s| s.error = Some(e.to_string()));
            }
        }

        if config.max_polls.is_some_and(|max| polls >= max) {
            tracing::warn!(job_id, polls, "Giving up on artifacts");
            update(tx, cancel, |s| {
                s.error = Some(TIMED_OUT_MESSAGE.to_string());
                s.status = ClientStatus::Idle;
            });
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const ARTIFACTS_PATH: &str = "/v1/jobs/job-1/artifacts";

    fn fast() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(10),
            max_polls: Some(50),
            stream: false,
        }
    }

    fn api(server: &MockServer) -> Arc<KernelApi> {
        Arc::new(KernelApi::new(server.uri(), None))
    }

    async fn artifact_polls(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == ARTIFACTS_PATH)
            .count()
    }

    fn request() -> SlidesGenerateRequest {
        SlidesGenerateRequest {
            prompt: "A short history of Andalusian architecture".to_string(),
            slides_count: 10,
            language: "ar".to_string(),
            theme: None,
            template_id: None,
            upload_id: None,
        }
    }

    #[tokio::test]
    async fn polling_stops_once_pptx_is_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plan_id": "p-1", "status": "completed", "pptx_url": "https://cdn.test/d.pptx"
            })))
            .mount(&server)
            .await;

        let mut handle = ExportsPoller::watch(api(&server), "job-1", fast());
        let snapshot = handle.wait().await;

        assert_eq!(snapshot.status, ClientStatus::Idle);
        assert!(snapshot.is_ready());
        assert_eq!(snapshot.plan_id.as_deref(), Some("p-1"));
        assert!(snapshot.error.is_none());
        assert_eq!(artifact_polls(&server).await, 3);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(artifact_polls(&server).await, 3);
    }

    #[tokio::test]
    async fn slides_array_alone_ends_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"slides": ["https://cdn.test/1.png"]})),
            )
            .mount(&server)
            .await;

        let mut handle = ExportsPoller::watch(api(&server), "job-1", fast());
        let snapshot = handle.wait().await;
        assert!(snapshot.is_ready());
        assert_eq!(artifact_polls(&server).await, 1);
    }

    #[tokio::test]
    async fn cancel_stops_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
            .mount(&server)
            .await;

        let config = PollConfig {
            max_polls: None,
            ..fast()
        };
        let mut handle = ExportsPoller::watch(api(&server), "job-1", config);
        tokio::time::sleep(Duration::from_millis(45)).await;
        handle.cancel();

        let snapshot = handle.wait().await;
        assert_eq!(snapshot.status, ClientStatus::Idle);
        assert!(snapshot.error.is_none());

        let polls = artifact_polls(&server).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(artifact_polls(&server).await, polls);
    }

    #[tokio::test]
    async fn errors_do_not_stop_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"pdf_url": "https://cdn.test/d.pdf"})),
            )
            .mount(&server)
            .await;

        let mut handle = ExportsPoller::watch(api(&server), "job-1", fast());
        let snapshot = handle.wait().await;

        assert!(snapshot.is_ready());
        assert!(snapshot.error.is_none(), "success clears the earlier error");
        assert_eq!(artifact_polls(&server).await, 3);
    }

    #[tokio::test]
    async fn failed_polls_surface_error_string_until_max_polls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let config = PollConfig {
            interval: Duration::from_millis(40),
            max_polls: Some(3),
            stream: false,
        };
        let mut handle = ExportsPoller::watch(api(&server), "job-1", config);
        let mut rx = handle.subscribe();

        let seen_error = rx
            .wait_for(|s| s.error.as_deref().is_some_and(|e| e.contains("503")))
            .await
            .map(|s| s.is_running())
            .unwrap_or(false);
        assert!(seen_error, "error is reported while still running");

        let snapshot = handle.wait().await;
        assert_eq!(snapshot.error.as_deref(), Some(TIMED_OUT_MESSAGE));
        assert_eq!(snapshot.status, ClientStatus::Idle);
        assert_eq!(artifact_polls(&server).await, 3);
    }

    #[tokio::test]
    async fn ids_and_links_are_read_from_logs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logs": ["planning", "plan_id: p-77", "exported https://cdn.test/out/deck.pdf"]
            })))
            .mount(&server)
            .await;

        let mut handle = ExportsPoller::watch(api(&server), "job-1", fast());
        let snapshot = handle.wait().await;

        assert!(snapshot.is_ready());
        assert_eq!(snapshot.plan_id.as_deref(), Some("p-77"));
        assert_eq!(
            snapshot.artifacts.and_then(|a| a.pdf_url).as_deref(),
            Some("https://cdn.test/out/deck.pdf")
        );
        assert_eq!(snapshot.log.lines().count(), 3);
    }

    #[tokio::test]
    async fn cumulative_logs_are_not_duplicated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logs": ["a"]})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logs": ["a", "b"], "slides": ["https://cdn.test/1.png"]
            })))
            .mount(&server)
            .await;

        let mut handle = ExportsPoller::watch(api(&server), "job-1", fast());
        let snapshot = handle.wait().await;
        assert_eq!(snapshot.log, "a\nb\n");
    }

    #[tokio::test]
    async fn start_submits_then_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/services/slides.generate/jobs"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"job_id": "job-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plan_id": "p-5", "pptx_url": "https://cdn.test/d.pptx"
            })))
            .mount(&server)
            .await;

        let mut handle = SlidesJob::start(api(&server), &request(), fast()).await.unwrap();
        assert_eq!(handle.snapshot().job_id.as_deref(), Some("job-1"));

        let snapshot = handle.wait().await;
        assert!(snapshot.is_ready());
        assert_eq!(snapshot.plan_id.as_deref(), Some("p-5"));
    }

    #[tokio::test]
    async fn start_rejects_invalid_request_without_calling_kernel() {
        let server = MockServer::start().await;
        let bad = SlidesGenerateRequest {
            slides_count: 0,
            ..request()
        };

        let result = SlidesJob::start(api(&server), &bad, fast()).await;
        assert_matches!(result, Err(PollError::Invalid(CoreError::Validation(_))));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn start_surfaces_kernel_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/services/slides.generate/jobs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let result = SlidesJob::start(api(&server), &request(), fast()).await;
        assert_matches!(
            result,
            Err(PollError::Start(KernelApiError::ApiError { status: 500, .. }))
        );
    }

    #[tokio::test]
    async fn stream_mode_finishes_without_polling() {
        let server = MockServer::start().await;
        let body = "event: token\ndata: Building deck \n\n\
                    event: log\ndata: job_id: job-1\n\n\
                    event: artifacts\n\
                    data: {\"plan_id\":\"p-3\",\"pdf_url\":\"https://cdn.test/d.pdf\"}\n\n";
        Mock::given(method("GET"))
            .and(path("/v1/jobs/job-1/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let config = PollConfig {
            stream: true,
            ..fast()
        };
        let mut handle = ExportsPoller::watch(api(&server), "job-1", config);
        let snapshot = handle.wait().await;

        assert!(snapshot.is_ready());
        assert_eq!(snapshot.plan_id.as_deref(), Some("p-3"));
        assert!(snapshot.log.starts_with("Building deck "));
        assert_eq!(artifact_polls(&server).await, 0);
    }

    #[test]
    fn tokens_are_scanned_once_a_line_completes() {
        let mut snapshot = JobSnapshot::default();
        snapshot.push_token("plan_");
        snapshot.push_token("id: p-");
        assert_eq!(snapshot.scanned, 0);
        assert!(snapshot.plan_id.is_none());

        snapshot.push_token("77\nrendering");
        assert_eq!(snapshot.plan_id.as_deref(), Some("p-77"));
        assert_eq!(snapshot.scanned, "plan_id: p-77\n".len());

        snapshot.push_token(" https://cdn.test/deck.pdf");
        snapshot.refresh_from_log(true);
        assert_eq!(snapshot.log_ids.pdf_url.as_deref(), Some("https://cdn.test/deck.pdf"));
        assert_eq!(snapshot.scanned, "plan_id: p-77\n".len());
    }

    #[test]
    fn later_lines_override_earlier_links() {
        let mut snapshot = JobSnapshot::default();
        snapshot.push_log_line("draft https://cdn.test/v1.pptx");
        snapshot.refresh_from_log(false);
        snapshot.push_log_line("final https://cdn.test/v2.pptx");
        snapshot.refresh_from_log(false);
        assert_eq!(snapshot.log_ids.pptx_url.as_deref(), Some("https://cdn.test/v2.pptx"));
    }

    #[tokio::test]
    async fn ids_split_across_stream_tokens_are_found() {
        let server = MockServer::start().await;
        let body = "event: token\ndata: plan_\n\n\
                    event: token\ndata: id: p-9\n\n\
                    event: done\ndata: {}\n\n";
        Mock::given(method("GET"))
            .and(path("/v1/jobs/job-1/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"pdf_url": "https://cdn.test/d.pdf"})),
            )
            .mount(&server)
            .await;

        let config = PollConfig {
            stream: true,
            ..fast()
        };
        let mut handle = ExportsPoller::watch(api(&server), "job-1", config);
        let snapshot = handle.wait().await;

        assert!(snapshot.is_ready());
        assert_eq!(snapshot.plan_id.as_deref(), Some("p-9"));
    }

    #[tokio::test]
    async fn stream_failure_falls_back_to_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/jobs/job-1/stream"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARTIFACTS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"pptx_url": "https://cdn.test/d.pptx"})),
            )
            .mount(&server)
            .await;

        let config = PollConfig {
            stream: true,
            ..fast()
        };
        let mut handle = ExportsPoller::watch(api(&server), "job-1", config);
        let snapshot = handle.wait().await;

        assert!(snapshot.is_ready());
        assert_eq!(artifact_polls(&server).await, 1);
    }
}
