//! Codepost-Core: templates, settings and the publish pipeline
//!
//! Ties the extraction bridge and the contents client together into one
//! publish attempt: settings → page facts → editor buffer → rendered draft →
//! confirmation → upsert → notification.
//!
//! ## Layer 2 - Orchestration
//!
//! ## Key Components
//!
//! - `Publisher`: runs one attempt over trait-object collaborators
//! - `template::render`: single-pass placeholder substitution
//! - `FactSheet`: immutable per-attempt facts
//! - `Settings` / `SettingsStore`: persisted configuration
//! - `NotificationCenter`: pending outcome notifications
//! - `init_tracing` and `obs`: logging

pub mod confirm;
pub mod connector;
mod error;
pub mod facts;
pub mod language;
pub mod notify;
pub mod obs;
pub mod page;
pub mod publisher;
pub mod settings;
pub mod telemetry;
pub mod template;

pub use confirm::{AutoConfirm, Confirmer, RequestDraft};
pub use connector::{ContentsConnector, GithubConnector, SharedApiConnector};
pub use error::{PublishError, SettingsError, ValidationError};
pub use facts::FactSheet;
pub use language::extension_for;
pub use notify::{NotificationCenter, NotificationId, Notifier};
pub use page::{canonical_problem_url, parse_title, PageFactsProvider, ProblemFacts, StaticPageFacts};
pub use publisher::{prepare_draft, PublishReport, Publisher};
pub use settings::{
    Credentials, FileSettingsStore, MemorySettingsStore, Settings, SettingsStore,
};
pub use telemetry::init_tracing;
pub use template::{render, render_body, Placeholder};

/// Result type for codepost-core operations
pub type Result<T> = std::result::Result<T, PublishError>;
