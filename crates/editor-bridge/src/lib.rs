//! Editor-Bridge: reading an in-page editor buffer across a message boundary
//!
//! The orchestrator cannot call into the page's editor widget directly. It
//! registers a listener on the page's message bus, injects a probe into the
//! page context, and waits (bounded by a hard timeout) for the probe to post
//! the buffer back as a tagged message.
//!
//! ## Layer 1 - Extraction
//!
//! Focus: exactly-once delivery per request, with every listener and probe
//! released on every exit path.
//!
//! ## Key Components
//!
//! - `PageWindow`: message bus shared by both contexts
//! - `BridgeEnvelope`: the tagged wire format
//! - `run_probe`: page-context poller with a retry budget
//! - `ProbeInjector` / `InProcessPage`: how the probe gets into the page
//! - `ExtractionBridge`: caller side, implements `CodeExtractor`

pub mod bridge;
mod error;
pub mod message;
pub mod probe;
pub mod window;

pub use bridge::{BridgeConfig, CodeExtractor, ExtractionBridge};
pub use error::ExtractionError;
pub use message::{parse_reply, BridgeEnvelope, BridgeReply, BRIDGE_SOURCE};
pub use probe::{
    run_probe, EditorRuntime, InProcessPage, ProbeConfig, ProbeHandle, ProbeInjector,
    RuntimeProbe, StaticEditorRuntime, EDITOR_UNAVAILABLE,
};
pub use window::{ListenerGuard, MessageOrigin, PageWindow, WindowMessage};

/// Result type for editor-bridge operations
pub type Result<T> = std::result::Result<T, ExtractionError>;
