//! Page-context probe.
//!
//! [`run_probe`] is what gets injected into the page. It polls the editor
//! runtime until the buffer is readable, then posts exactly one tagged
//! message and stops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::message::BridgeEnvelope;
use crate::window::PageWindow;

/// Reported when the retry budget runs out before the editor loads.
pub const EDITOR_UNAVAILABLE: &str = "editor runtime not available";

/// One look at the editor runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeProbe {
    /// The widget (or its model) does not exist yet
    NotLoaded,
    Ready(String),
    /// Reading the buffer raised
    Failed(String),
}

/// The page's code editor as seen from the page context.
pub trait EditorRuntime: Send + Sync {
    fn read_buffer(&self) -> RuntimeProbe;
}

/// Editor that always holds the same buffer.
#[derive(Debug, Clone)]
pub struct StaticEditorRuntime {
    buffer: String,
}

impl StaticEditorRuntime {
    pub fn new(buffer: impl Into<String>) -> Self {
        StaticEditorRuntime {
            buffer: buffer.into(),
        }
    }
}

impl EditorRuntime for StaticEditorRuntime {
    fn read_buffer(&self) -> RuntimeProbe {
        RuntimeProbe::Ready(self.buffer.clone())
    }
}

/// Retry budget of the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Checks after the first one
    pub retries: u32,
    /// Pause between checks
    pub delay: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            retries: 50,
            delay: Duration::from_millis(200),
        }
    }
}

impl ProbeConfig {
    /// Time from injection to the last check when the editor never loads.
    pub fn worst_case_window(&self) -> Duration {
        self.delay.saturating_mul(self.retries)
    }
}

/// Poll `runtime` and post the result to `window`.
///
/// Returns the envelope that was posted.
pub async fn run_probe(
    window: PageWindow,
    runtime: Arc<dyn EditorRuntime>,
    config: ProbeConfig,
) -> BridgeEnvelope {
    let mut attempt: u32 = 0;
    let envelope = loop {
        attempt += 1;
        match runtime.read_buffer() {
            RuntimeProbe::Ready(code) => {
                debug!(attempt, bytes = code.len(), "editor buffer read");
                break BridgeEnvelope::editor_value(code);
            }
            RuntimeProbe::Failed(reason) => {
                debug!(attempt, %reason, "editor buffer read raised");
                break BridgeEnvelope::error(reason);
            }
            RuntimeProbe::NotLoaded if attempt <= config.retries => {
                debug!(attempt, "editor not loaded yet");
                tokio::time::sleep(config.delay).await;
            }
            RuntimeProbe::NotLoaded => {
                debug!(attempt, "probe retry budget exhausted");
                break BridgeEnvelope::error(EDITOR_UNAVAILABLE);
            }
        }
    };

    window.post_message(envelope.to_json());
    envelope
}

/// A running probe. Dropping the handle aborts the probe if it is still
/// polling.
#[derive(Debug)]
pub struct ProbeHandle {
    task: JoinHandle<BridgeEnvelope>,
}

impl ProbeHandle {
    /// Spawn `probe` on the current tokio runtime.
    pub fn spawn<F>(probe: F) -> Self
    where
        F: std::future::Future<Output = BridgeEnvelope> + Send + 'static,
    {
        ProbeHandle {
            task: tokio::spawn(probe),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!("aborting probe");
            self.task.abort();
        }
    }
}

/// Gets a probe running inside the page context.
///
/// Each call starts an independent probe; calling it again while an earlier
/// probe runs is allowed.
pub trait ProbeInjector: Send + Sync {
    fn inject(&self, config: ProbeConfig) -> ProbeHandle;
}

/// A page whose editor lives in this process.
#[derive(Clone)]
pub struct InProcessPage {
    window: PageWindow,
    runtime: Arc<dyn EditorRuntime>,
    injections: Arc<AtomicU64>,
}

impl InProcessPage {
    pub fn new(window: PageWindow, runtime: Arc<dyn EditorRuntime>) -> Self {
        InProcessPage {
            window,
            runtime,
            injections: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    /// Number of probes injected so far.
    pub fn injections(&self) -> u64 {
        self.injections.load(Ordering::SeqCst)
    }
}

impl ProbeInjector for InProcessPage {
    fn inject(&self, config: ProbeConfig) -> ProbeHandle {
        self.injections.fetch_add(1, Ordering::SeqCst);
        ProbeHandle::spawn(run_probe(
            self.window.clone(),
            self.runtime.clone(),
            config,
        ))
    }
}
