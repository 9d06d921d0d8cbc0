//! The page's message bus.
//!
//! Every registered listener owns an unbounded queue and sees every message
//! posted after it registered, however many arrive before it is polled.
//! Dropping a [`ListenerGuard`] deregisters it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::ExtractionError;
use crate::message::{parse_reply, BridgeReply};

/// Where a message was posted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Posted by a script running in this same window
    SameWindow,
    /// Posted by another frame or window
    Foreign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowMessage {
    pub origin: MessageOrigin,
    pub data: Value,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<u64, mpsc::UnboundedSender<WindowMessage>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to one page's message bus. Clones share the bus; once the last
/// clone is dropped, waiting listeners see [`ExtractionError::BusClosed`].
#[derive(Debug, Clone, Default)]
pub struct PageWindow {
    registry: Arc<Mutex<Registry>>,
}

impl PageWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post from a script in this window. Returns how many listeners saw it;
    /// posting with nobody listening is not an error.
    pub fn post_message(&self, data: Value) -> usize {
        self.post(MessageOrigin::SameWindow, data)
    }

    /// Post as if from another frame.
    pub fn post_foreign(&self, data: Value) -> usize {
        self.post(MessageOrigin::Foreign, data)
    }

    fn post(&self, origin: MessageOrigin, data: Value) -> usize {
        let message = WindowMessage { origin, data };
        let mut registry = lock(&self.registry);
        registry
            .listeners
            .retain(|_, sender| sender.send(message.clone()).is_ok());
        registry.listeners.len()
    }

    /// Register a listener. It only sees messages posted from now on.
    pub fn listen(&self) -> ListenerGuard {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, sender);
        trace!(id, "listener registered");

        ListenerGuard {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// A registered listener, deregistered on drop.
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    receiver: mpsc::UnboundedReceiver<WindowMessage>,
    registry: Weak<Mutex<Registry>>,
}

impl ListenerGuard {
    /// Wait for the next message that [`parse_reply`] accepts.
    pub async fn next_reply(&mut self) -> Result<BridgeReply, ExtractionError> {
        while let Some(message) = self.receiver.recv().await {
            if let Some(reply) = parse_reply(&message) {
                return Ok(reply);
            }
            trace!(origin = ?message.origin, "ignoring untagged message");
        }
        Err(ExtractionError::BusClosed)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.remove(&self.id);
        }
        trace!(id = self.id, "listener released");
    }
}
