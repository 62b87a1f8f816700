//! Job artifacts and log-text ID extraction.
//!
//! The kernel's `GET /v1/jobs/{id}/artifacts` response is modelled by
//! [`JobArtifacts`]. [`JobArtifacts::is_ready`] is the stop condition for
//! artifact polling. [`extract_ids`] scans accumulated log text for job and
//! plan identifiers and export links the structured response may be missing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// One slide entry. The kernel sends either a bare URL or an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideLink {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl SlideLink {
    pub fn url(&self) -> &str {
        match self {
            SlideLink::Url(url) => url,
            SlideLink::Detailed { url, .. } => url,
        }
    }
}

/// Artifacts reported for a generation job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobArtifacts {
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pptx_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub slides: Vec<SlideLink>,
    /// Log lines emitted since the job started.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

fn present(url: &Option<String>) -> bool {
    url.as_deref().is_some_and(|u| !u.trim().is_empty())
}

impl JobArtifacts {
    /// True once a PPTX link, a PDF link or at least one slide is available.
    ///
    /// An HTML export on its own does not end polling.
    pub fn is_ready(&self) -> bool {
        present(&self.pptx_url) || present(&self.pdf_url) || !self.slides.is_empty()
    }

    /// Fill empty fields from IDs found in log text. Existing values win.
    pub fn fill_from_log(&mut self, ids: &LogIds) {
        if !present(&self.plan_id) {
            self.plan_id.clone_from(&ids.plan_id);
        }
        if !present(&self.pptx_url) {
            self.pptx_url.clone_from(&ids.pptx_url);
        }
        if !present(&self.pdf_url) {
            self.pdf_url.clone_from(&ids.pdf_url);
        }
        if !present(&self.html_url) {
            self.html_url.clone_from(&ids.html_url);
        }
    }
}

// ---------------------------------------------------------------------------
// Log extraction
// ---------------------------------------------------------------------------

static JOB_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bjob[_\s-]?id["']?\s*[:=]\s*["']?([A-Za-z0-9][A-Za-z0-9_-]{2,})"#)
        .expect("valid regex")
});

static PLAN_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bplan[_\s-]?id["']?\s*[:=]\s*["']?([A-Za-z0-9][A-Za-z0-9_-]{2,})"#)
        .expect("valid regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>)\]]+"#).expect("valid regex"));

/// Identifiers and export links found in job log text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogIds {
    pub job_id: Option<String>,
    pub plan_id: Option<String>,
    pub pptx_url: Option<String>,
    pub pdf_url: Option<String>,
    pub html_url: Option<String>,
}

impl LogIds {
    /// Overlay ids found in later log text; each one found replaces the
    /// current value.
    pub fn merge(&mut self, newer: LogIds) {
        let slots = [
            (&mut self.job_id, newer.job_id),
            (&mut self.plan_id, newer.plan_id),
            (&mut self.pptx_url, newer.pptx_url),
            (&mut self.pdf_url, newer.pdf_url),
            (&mut self.html_url, newer.html_url),
        ];
        for (slot, value) in slots {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

fn last_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Scan log text for `job_id` / `plan_id` mentions and export URLs.
///
/// The last occurrence of each wins, so later log lines override earlier
/// ones. URLs are classified by path extension; query strings are allowed.
pub fn extract_ids(log: &str) -> LogIds {
    let mut ids = LogIds {
        job_id: last_capture(&JOB_ID_RE, log),
        plan_id: last_capture(&PLAN_ID_RE, log),
        ..LogIds::default()
    };

    for m in URL_RE.find_iter(log) {
        let url = m.as_str().trim_end_matches(['.', ',', ';']);
        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
        let slot = if path.ends_with(".pptx") {
            &mut ids.pptx_url
        } else if path.ends_with(".pdf") {
            &mut ids.pdf_url
        } else if path.ends_with(".html") || path.ends_with(".htm") {
            &mut ids.html_url
        } else {
            continue;
        };
        *slot = Some(url.to_string());
    }

    ids
}
