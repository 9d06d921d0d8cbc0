//! Repo-Contents: single-file create-or-update against the GitHub contents API
//!
//! This crate owns the remote side of a codepost publish. It turns a
//! [`PublishRequest`] into exactly one lookup followed by exactly one write,
//! and reports the result as an [`OutcomeNotification`].
//!
//! ## Layer 0 - Remote Store
//!
//! Focus: correct handling of the optimistic-concurrency token (`sha`).
//!
//! ## Key Components
//!
//! - `ContentsApi`: transport seam (GET/PUT of one contents path)
//! - `GithubContentsApi`: reqwest implementation of `ContentsApi`
//! - `UpsertClient`: lookup-then-write algorithm
//! - `normalize_content` / `encode_content`: payload preparation
//! - `fakes::MemoryContentsApi`: in-memory store for tests

pub mod api;
pub mod content;
mod error;
pub mod fakes;
pub mod outcome;
pub mod request;
pub mod upsert;

pub use api::{ContentsApi, ContentsConfig, GithubContentsApi, RawResponse};
pub use content::{decode_content, encode_content, normalize_content};
pub use error::{ContentsError, TransportError};
pub use outcome::{OutcomeKind, OutcomeNotification};
pub use request::{FileLocation, PublishRequest};
pub use upsert::{verify_access, RemoteFileState, UpsertClient, WritePayload};

/// Result type for repo-contents operations
pub type Result<T> = std::result::Result<T, ContentsError>;
