//! Caller side of the extraction protocol.
//!
//! [`ExtractionBridge::extract`] registers a listener, injects a probe, and
//! races the listener against a hard timeout. The listener guard and the
//! probe handle are locals of that call, so both are released however the
//! race ends.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::message::BridgeReply;
use crate::probe::{InProcessPage, ProbeConfig, ProbeInjector};
use crate::window::PageWindow;

/// Timing budgets of one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// How long the caller waits for a tagged reply
    pub caller_timeout: Duration,
    pub probe: ProbeConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            caller_timeout: Duration::from_millis(200),
            probe: ProbeConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Stretch the caller timeout so it outlasts the probe's whole retry
    /// budget, plus one delay of slack.
    pub fn covering_probe_window(mut self) -> Self {
        self.caller_timeout = self
            .probe
            .worst_case_window()
            .saturating_add(self.probe.delay);
        self
    }

    pub fn caller_timeout_ms(&self) -> u64 {
        u64::try_from(self.caller_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Anything that can produce the current editor buffer.
#[async_trait]
pub trait CodeExtractor: Send + Sync {
    async fn extract_code(&self) -> Result<String, ExtractionError>;
}

/// Extraction over a page bus and a probe injector.
///
/// The injector's probes must post to the same `window` the bridge listens
/// on.
pub struct ExtractionBridge<I> {
    window: PageWindow,
    injector: I,
    config: BridgeConfig,
}

impl<I: ProbeInjector> ExtractionBridge<I> {
    pub fn new(window: PageWindow, injector: I, config: BridgeConfig) -> Self {
        ExtractionBridge {
            window,
            injector,
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    /// Run one extraction. Never retries.
    pub async fn extract(&self) -> Result<String, ExtractionError> {
        let mut listener = self.window.listen();
        let _probe = self.injector.inject(self.config.probe);

        let reply = tokio::time::timeout(self.config.caller_timeout, listener.next_reply()).await;

        match reply {
            Ok(Ok(BridgeReply::EditorValue(code))) => {
                debug!(bytes = code.len(), "editor buffer extracted");
                Ok(code)
            }
            Ok(Ok(BridgeReply::Error(reason))) => {
                warn!(%reason, "probe reported an error");
                Err(ExtractionError::Probe(reason))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                let timeout_ms = self.config.caller_timeout_ms();
                warn!(timeout_ms, "editor extraction timed out");
                Err(ExtractionError::Timeout { timeout_ms })
            }
        }
    }
}

impl ExtractionBridge<InProcessPage> {
    /// Bridge that listens on the page's own window.
    pub fn for_page(page: InProcessPage, config: BridgeConfig) -> Self {
        let window = page.window().clone();
        Self::new(window, page, config)
    }
}

#[async_trait]
impl<I: ProbeInjector> CodeExtractor for ExtractionBridge<I> {
    async fn extract_code(&self) -> Result<String, ExtractionError> {
        self.extract().await
    }
}
