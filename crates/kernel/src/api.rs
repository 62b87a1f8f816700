//! REST API client for the Agentic Kernel HTTP endpoints.
//!
//! Wraps uploads, slide generation jobs, artifact retrieval, the job event
//! stream, dubbing jobs and presentation lookups using [`reqwest`].

use futures::Stream;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::Deserialize;
use sharayeh_core::artifacts::JobArtifacts;
use sharayeh_core::validation::{DubbingRequest, SlidesGenerateRequest};

use crate::events::KernelEvent;
use crate::sse;

/// One item of a job's event stream.
pub type EventResult = Result<KernelEvent, KernelApiError>;

/// Kernel service name for slide deck generation.
pub const SLIDES_SERVICE: &str = "slides.generate";

/// HTTP client for the Agentic Kernel.
#[derive(Debug, Clone)]
pub struct KernelApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Response to a job submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedJob {
    #[serde(alias = "id")]
    pub job_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
}

/// Response to a file upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    #[serde(alias = "id")]
    pub upload_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// A dubbing job as reported by the kernel.
#[derive(Debug, Clone, Deserialize)]
pub struct DubbingJob {
    #[serde(alias = "id")]
    pub job_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output_url: Option<String>,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

/// A presentation as reported by `GET /v1/presentations/{plan_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Presentation {
    #[serde(alias = "id")]
    pub plan_id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub slides_count: Option<i32>,
    #[serde(default)]
    pub pptx_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Errors from the kernel REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum KernelApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The kernel returned a non-2xx status code.
    #[error("Kernel API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A resource id that cannot be used as a single path segment.
    #[error("Invalid kernel resource id: {0:?}")]
    InvalidId(String),

    /// The configured kernel base URL does not parse as an absolute URL.
    #[error("Invalid kernel base URL: {0}")]
    InvalidBaseUrl(String),
}

impl KernelApi {
    /// Create a client for the kernel at `base_url`, e.g. `http://localhost:8000`.
    ///
    /// When `api_key` is set it is sent as a bearer token on every request.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a source document. Sends `POST /v1/uploads` as multipart.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, KernelApiError> {
        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(mime) = content_type {
            part = part.mime_str(mime)?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .request(Method::POST, &["v1", "uploads"])?
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Submit a slide generation job.
    ///
    /// Sends `POST /v1/services/slides.generate/jobs` with the request as the
    /// JSON body.
    pub async fn create_slides_job(
        &self,
        request: &SlidesGenerateRequest,
    ) -> Result<CreatedJob, KernelApiError> {
        let response = self
            .request(Method::POST, &["v1", "services", SLIDES_SERVICE, "jobs"])?
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current artifacts of a job (`GET /v1/jobs/{id}/artifacts`).
    pub async fn get_artifacts(&self, job_id: &str) -> Result<JobArtifacts, KernelApiError> {
        let response = self
            .request(Method::GET, &["v1", "jobs", job_id, "artifacts"])?
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Open the job's server-sent event stream (`GET /v1/jobs/{id}/stream`).
    ///
    /// Frames with unknown event names are skipped. The stream ends when the
    /// kernel closes the connection.
    pub async fn stream_job(
        &self,
        job_id: &str,
    ) -> Result<impl Stream<Item = EventResult> + Send + 'static, KernelApiError> {
        let response = self
            .request(Method::GET, &["v1", "jobs", job_id, "stream"])?
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(sse::event_stream(response.bytes_stream()))
    }

    /// Submit a dubbing job (`POST /v1/dubbing/jobs`).
    pub async fn create_dubbing_job(
        &self,
        request: &DubbingRequest,
    ) -> Result<CreatedJob, KernelApiError> {
        let response = self
            .request(Method::POST, &["v1", "dubbing", "jobs"])?
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch a dubbing job (`GET /v1/dubbing/jobs/{id}`).
    pub async fn get_dubbing_job(&self, job_id: &str) -> Result<DubbingJob, KernelApiError> {
        let response = self
            .request(Method::GET, &["v1", "dubbing", "jobs", job_id])?
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch a presentation (`GET /v1/presentations/{plan_id}`).
    pub async fn get_presentation(&self, plan_id: &str) -> Result<Presentation, KernelApiError> {
        let response = self
            .request(Method::GET, &["v1", "presentations", plan_id])?
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Kernel URL for `segments`, each percent-encoded as one path segment.
    ///
    /// Empty, `.` and `..` segments are rejected so caller-supplied ids can
    /// never leave their own segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, KernelApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(KernelApiError::InvalidId(bad.to_string()));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| KernelApiError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| KernelApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, KernelApiError> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.api_key {
            Some(key) => builder.header(AUTHORIZATION, format!("Bearer {key}")),
            None => builder,
        })
    }

    /// Return the response unchanged on success, or an
    /// [`KernelApiError::ApiError`] carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, KernelApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(KernelApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, KernelApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
