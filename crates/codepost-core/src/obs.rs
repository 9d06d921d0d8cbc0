//! Structured lifecycle events of a publish attempt.
//!
//! Every event carries `event` and `attempt_id` fields so one attempt can be
//! followed through JSON logs.

use repo_contents::OutcomeKind;
use tracing::{info, warn};

/// Span covering one attempt. Attach with `Instrument::instrument`.
pub fn publish_span(attempt_id: &str) -> tracing::Span {
    tracing::info_span!("codepost.publish", attempt_id = %attempt_id)
}

pub fn emit_publish_started(attempt_id: &str, problem_no: &str, language: &str) {
    info!(
        event = "publish.started",
        attempt_id = %attempt_id,
        problem_no = %problem_no,
        language = %language,
    );
}

pub fn emit_extraction_failed(attempt_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "extraction.failed", attempt_id = %attempt_id, error = %error);
}

pub fn emit_publish_cancelled(attempt_id: &str) {
    info!(event = "publish.cancelled", attempt_id = %attempt_id);
}

pub fn emit_publish_outcome(attempt_id: &str, kind: OutcomeKind, target_url: &str) {
    info!(
        event = "publish.outcome",
        attempt_id = %attempt_id,
        kind = %kind,
        target_url = %target_url,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_and_events_do_not_panic() {
        let _entered = publish_span("attempt-1").entered();
        emit_publish_started("attempt-1", "1", "Python3");
        emit_extraction_failed("attempt-1", &"timed out");
        emit_publish_cancelled("attempt-1");
        emit_publish_outcome("attempt-1", OutcomeKind::Success, "https://github.com");
    }
}
