//! Canonical status values for mirror rows.
//!
//! The kernel reports job status as free-form strings. Mirrors store the
//! normalized form so dashboard filters and counts have a fixed vocabulary.
//! No transitions are computed here; a status is only ever copied.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    Unknown,
}

impl MirrorStatus {
    /// Every canonical value, in display order.
    pub const ALL: [MirrorStatus; 6] = [
        MirrorStatus::Queued,
        MirrorStatus::Running,
        MirrorStatus::Completed,
        MirrorStatus::Failed,
        MirrorStatus::Cancelled,
        MirrorStatus::Unknown,
    ];

    /// Map a kernel status string onto the canonical set.
    pub fn normalize(raw: &str) -> MirrorStatus {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" | "created" | "waiting" => MirrorStatus::Queued,
            "running" | "processing" | "in_progress" | "started" | "generating" => {
                MirrorStatus::Running
            }
            "completed" | "complete" | "done" | "succeeded" | "success" | "finished" => {
                MirrorStatus::Completed
            }
            "failed" | "error" | "errored" => MirrorStatus::Failed,
            "cancelled" | "canceled" | "aborted" => MirrorStatus::Cancelled,
            _ => MirrorStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MirrorStatus::Queued => "queued",
            MirrorStatus::Running => "running",
            MirrorStatus::Completed => "completed",
            MirrorStatus::Failed => "failed",
            MirrorStatus::Cancelled => "cancelled",
            MirrorStatus::Unknown => "unknown",
        }
    }

    /// Terminal rows are no longer refreshed by the background sync.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MirrorStatus::Completed | MirrorStatus::Failed | MirrorStatus::Cancelled
        )
    }

    /// Canonical strings of the statuses that still need syncing.
    pub fn non_terminal() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|s| !s.is_terminal())
            .map(|s| s.as_str())
            .collect()
    }
}

impl fmt::Display for MirrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_synonyms() {
        assert_eq!(MirrorStatus::normalize("PENDING"), MirrorStatus::Queued);
        assert_eq!(MirrorStatus::normalize(" in_progress "), MirrorStatus::Running);
        assert_eq!(MirrorStatus::normalize("succeeded"), MirrorStatus::Completed);
        assert_eq!(MirrorStatus::normalize("error"), MirrorStatus::Failed);
        assert_eq!(MirrorStatus::normalize("canceled"), MirrorStatus::Cancelled);
    }

    #[test]
    fn unrecognized_is_unknown() {
        assert_eq!(MirrorStatus::normalize("exploded"), MirrorStatus::Unknown);
        assert_eq!(MirrorStatus::normalize(""), MirrorStatus::Unknown);
    }

    #[test]
    fn as_str_round_trips_through_normalize() {
        for status in MirrorStatus::ALL {
            assert_eq!(MirrorStatus::normalize(status.as_str()), status);
        }
    }

    #[test]
    fn non_terminal_includes_unknown() {
        assert_eq!(MirrorStatus::non_terminal(), vec!["queued", "running", "unknown"]);
    }
}
