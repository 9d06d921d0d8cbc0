//! User-visible result of one publish attempt.

use serde::{Deserialize, Serialize};

/// Which of the three terminal states the write ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The file was created or updated.
    Success,
    /// The store answered with a non-2xx status.
    Failure,
    /// No response was obtained (offline, DNS, TLS...).
    TransportError,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Failure => "failure",
            OutcomeKind::TransportError => "transport_error",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification handed to the display collaborator.
///
/// `target_url` is where a click should lead: the committed file on success,
/// the repository's issue tracker on rejection, the provider status page on a
/// transport error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeNotification {
    pub kind: OutcomeKind,
    pub target_url: String,
    /// Raw response body (failure) or error message (transport error).
    pub diagnostic: Option<String>,
    pub filename: String,
    /// `owner/repo`
    pub repository: String,
}

impl OutcomeNotification {
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }

    /// Short headline for display.
    pub fn title(&self) -> &'static str {
        match self.kind {
            OutcomeKind::Success => "GitHub Commit Successful",
            OutcomeKind::Failure => "GitHub Commit Failed",
            OutcomeKind::TransportError => "GitHub Connection Error",
        }
    }

    /// One-line body for display.
    pub fn message(&self) -> String {
        match self.kind {
            OutcomeKind::Success => {
                format!("File {} committed to {}", self.filename, self.repository)
            }
            OutcomeKind::Failure => format!(
                "Failed to commit {}. Open the notification to view error details.",
                self.filename
            ),
            OutcomeKind::TransportError => {
                "Network error occurred. Open the notification to view GitHub status.".to_string()
            }
        }
    }
}
