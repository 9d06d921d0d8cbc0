//! Hand-off of outcomes to whatever displays them.
//!
//! A notification lives until the user acts on it: [`NotificationCenter::click`]
//! returns where to go and forgets the entry, [`NotificationCenter::clear`]
//! just forgets it. [`NotificationCenter::clear_all`] drops everything still
//! pending, e.g. when the process winds down a session.

use std::collections::HashMap;
use std::sync::Mutex;

use repo_contents::OutcomeNotification;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        NotificationId(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, outcome: &OutcomeNotification) -> NotificationId;
}

/// Keeps pending notifications until clicked or cleared.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    pending: Mutex<HashMap<NotificationId, OutcomeNotification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user opened the notification: returns its target URL and
    /// removes it. `None` if it was already handled.
    pub fn click(&self, id: NotificationId) -> Option<String> {
        let removed = self.pending.lock().ok()?.remove(&id)?;
        debug!(%id, url = %removed.target_url, "notification clicked");
        Some(removed.target_url)
    }

    /// Remove without acting. Returns whether it was still pending.
    pub fn clear(&self, id: NotificationId) -> bool {
        self.pending
            .lock()
            .map(|mut pending| pending.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Forget every pending notification. Returns how many were dropped.
    pub fn clear_all(&self) -> usize {
        let dropped = self
            .pending
            .lock()
            .map(|mut pending| pending.drain().count())
            .unwrap_or(0);
        if dropped > 0 {
            debug!(dropped, "pending notifications cleared");
        }
        dropped
    }

    pub fn get(&self, id: NotificationId) -> Option<OutcomeNotification> {
        self.pending.lock().ok()?.get(&id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, outcome: &OutcomeNotification) -> NotificationId {
        let id = NotificationId::new();
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(id, outcome.clone());
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_contents::OutcomeKind;

    fn outcome() -> OutcomeNotification {
        OutcomeNotification {
            kind: OutcomeKind::Failure,
            target_url: "https://github.com/octo/solutions/issues".to_string(),
            diagnostic: Some("{\"message\":\"conflict\"}".to_string()),
            filename: "a.py".to_string(),
            repository: "octo/solutions".to_string(),
        }
    }

    #[test]
    fn test_click_returns_url_once() {
        let center = NotificationCenter::new();
        let id = center.notify(&outcome());
        assert_eq!(center.pending_count(), 1);

        assert_eq!(
            center.click(id).as_deref(),
            Some("https://github.com/octo/solutions/issues")
        );
        assert_eq!(center.click(id), None);
        assert_eq!(center.pending_count(), 0);
    }

    #[test]
    fn test_clear_removes_without_url() {
        let center = NotificationCenter::new();
        let id = center.notify(&outcome());

        assert!(center.clear(id));
        assert!(!center.clear(id));
        assert!(center.get(id).is_none());
    }

    #[test]
    fn test_clear_all_empties_the_center() {
        let center = NotificationCenter::new();
        let a = center.notify(&outcome());
        center.notify(&outcome());
        center.notify(&outcome());

        assert_eq!(center.clear_all(), 3);
        assert_eq!(center.pending_count(), 0);
        assert_eq!(center.click(a), None);
        assert_eq!(center.clear_all(), 0);
    }

    #[test]
    fn test_ids_are_distinct() {
        let center = NotificationCenter::new();
        let a = center.notify(&outcome());
        let b = center.notify(&outcome());
        assert_ne!(a, b);
        assert_eq!(center.pending_count(), 2);
    }
}
