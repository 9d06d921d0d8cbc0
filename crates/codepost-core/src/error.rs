//! Error types for the publish pipeline

use editor_bridge::ExtractionError;
use repo_contents::ContentsError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a publish attempt stopped before producing an outcome.
///
/// Remote rejections and transport failures are not errors here: they are
/// reported as an `OutcomeNotification`.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Token, owner or repository missing, or the credential not verified
    #[error("codepost is not configured: {0}")]
    ConfigurationMissing(String),

    /// Problem details could not be read from the page
    #[error("Could not read problem details: {0}")]
    Page(String),

    #[error("Could not extract code: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid commit details: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Contents client could not be built from the stored credential
    #[error(transparent)]
    Contents(#[from] ContentsError),
}

/// Problems with a confirmed draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File name cannot be empty")]
    EmptyFilename,

    #[error("Commit message cannot be empty")]
    EmptyCommitMessage,

    #[error("Repository must look like owner/repo, got {0:?}")]
    InvalidRepository(String),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `CODEPOST_SETTINGS` nor `HOME` is set
    #[error("Cannot locate the settings file: set CODEPOST_SETTINGS or HOME")]
    NoLocation,
}
