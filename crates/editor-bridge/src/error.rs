//! Error types for editor-bridge

use thiserror::Error;

/// Why an extraction produced no code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No tagged reply arrived before the caller's deadline
    #[error("Timed out after {timeout_ms}ms waiting for the editor buffer")]
    Timeout { timeout_ms: u64 },

    /// The probe reported a failure (exception or exhausted retries)
    #[error("Editor probe failed: {0}")]
    Probe(String),

    /// Every sender of the page bus is gone
    #[error("Page message bus closed before the editor buffer arrived")]
    BusClosed,
}
