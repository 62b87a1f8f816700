//! Typed job events from the kernel's event stream.
//!
//! Frames arrive either with a named `event:` field (`token`, `log`,
//! `status`, `artifacts`, `error`, `done`) or as default `message` frames
//! whose JSON data carries a `type` field with the same names.

use serde_json::Value;
use sharayeh_core::artifacts::JobArtifacts;

use crate::sse::SseFrame;

/// A single event emitted while a job runs.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelEvent {
    /// A fragment of streamed model output.
    Token(String),
    /// One log line.
    Log(String),
    /// The job's status changed.
    Status(String),
    /// A snapshot of the job's artifacts.
    Artifacts(JobArtifacts),
    /// The job reported an error. The stream may continue.
    Error(String),
    /// The job finished. No further events follow.
    Done,
}

impl KernelEvent {
    /// Map a frame onto an event. Returns `None` for unknown kinds and for
    /// artifact frames whose data does not parse.
    pub fn from_frame(frame: &SseFrame) -> Option<KernelEvent> {
        match frame.event.as_deref() {
            None | Some("message") => Self::from_message(&frame.data),
            Some(kind) => Self::from_kind(kind, &frame.data),
        }
    }

    fn from_kind(kind: &str, data: &str) -> Option<KernelEvent> {
        match kind {
            "token" => Some(KernelEvent::Token(data.to_string())),
            "log" => Some(KernelEvent::Log(data.to_string())),
            "status" => Some(KernelEvent::Status(text_field(data, &["status"]))),
            "error" => Some(KernelEvent::Error(text_field(data, &["message", "error"]))),
            "artifacts" => match serde_json::from_str::<JobArtifacts>(data) {
                Ok(artifacts) => Some(KernelEvent::Artifacts(artifacts)),
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed artifacts frame");
                    None
                }
            },
            "done" | "end" | "complete" => Some(KernelEvent::Done),
            _ => None,
        }
    }

    /// Default `message` frames: `{"type": "...", ...}`.
    fn from_message(data: &str) -> Option<KernelEvent> {
        let value: Value = serde_json::from_str(data).ok()?;
        let kind = value.get("type")?.as_str()?;
        match kind {
            "token" | "log" => {
                let text = ["content", "text", "message", "data"]
                    .iter()
                    .find_map(|k| value.get(*k).and_then(Value::as_str))?
                    .to_string();
                Some(if kind == "token" {
                    KernelEvent::Token(text)
                } else {
                    KernelEvent::Log(text)
                })
            }
            "artifacts" => {
                let payload = value.get("artifacts").or_else(|| value.get("data"))?;
                serde_json::from_value(payload.clone())
                    .ok()
                    .map(KernelEvent::Artifacts)
            }
            other => Self::from_kind(other, data),
        }
    }
}

/// Pull a string out of a JSON object by the first key present, falling
/// back to the raw (trimmed) data when it is not JSON.
fn text_field(data: &str, keys: &[&str]) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => keys
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| data.trim().to_string()),
        Ok(Value::String(s)) => s,
        _ => data.trim().to_string(),
    }
}
