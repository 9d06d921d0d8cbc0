//! Persisted user settings.
//!
//! The pipeline only reads settings. Keys are camelCase in the JSON file so
//! that a settings export from the browser extension loads unchanged.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use editor_bridge::{BridgeConfig, ProbeConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PublishError, SettingsError};

pub const DEFAULT_PATH: &str = "Leetcode";
pub const DEFAULT_FILE: &str = "<DD-MM-YYYY>_<PROBLEM_NO>";
pub const DEFAULT_COMMIT: &str = "Add Solution: <PROBLEM_NO>. <PROBLEM_NAME>";
pub const DEFAULT_BODY: &str =
    "// Problem: <PROBLEM_NO>. <PROBLEM_NAME> (<DIFFICULTY>)\n// Link: <URL>\n\n<CODE>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub github_token: Option<String>,
    pub github_username: Option<String>,
    pub github_repo: Option<String>,
    /// Set once the token has been checked against the repository
    pub is_authorized: bool,
    pub default_path: Option<String>,
    pub default_file: Option<String>,
    pub default_commit: Option<String>,
    pub default_comments: Option<String>,
    pub extension_enabled: bool,
    pub bridge_timeout_ms: Option<u64>,
    pub probe_retries: Option<u32>,
    pub probe_delay_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            github_token: None,
            github_username: None,
            github_repo: None,
            is_authorized: false,
            default_path: None,
            default_file: None,
            default_commit: None,
            default_comments: None,
            extension_enabled: true,
            bridge_timeout_ms: None,
            probe_retries: None,
            probe_delay_ms: None,
        }
    }
}

/// Everything needed to talk to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl Credentials {
    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    /// Token, owner and repository, provided all are set and the credential
    /// was verified.
    pub fn credentials(&self) -> Result<Credentials, PublishError> {
        let mut missing = Vec::new();
        let token = non_empty(&self.github_token);
        let owner = non_empty(&self.github_username);
        let repo = non_empty(&self.github_repo);

        if token.is_none() {
            missing.push("githubToken");
        }
        if owner.is_none() {
            missing.push("githubUsername");
        }
        if repo.is_none() {
            missing.push("githubRepo");
        }

        match (token, owner, repo) {
            (Some(token), Some(owner), Some(repo)) if self.is_authorized => Ok(Credentials {
                token: token.to_string(),
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            (Some(_), Some(_), Some(_)) => Err(PublishError::ConfigurationMissing(
                "credential has not been verified; run `codepost verify`".to_string(),
            )),
            _ => Err(PublishError::ConfigurationMissing(format!(
                "missing {}",
                missing.join(", ")
            ))),
        }
    }

    pub fn path_template(&self) -> &str {
        non_empty(&self.default_path).unwrap_or(DEFAULT_PATH)
    }

    pub fn file_template(&self) -> &str {
        non_empty(&self.default_file).unwrap_or(DEFAULT_FILE)
    }

    pub fn commit_template(&self) -> &str {
        non_empty(&self.default_commit).unwrap_or(DEFAULT_COMMIT)
    }

    pub fn body_template(&self) -> &str {
        // Not trimmed: leading/trailing newlines in a body template are intended.
        match self.default_comments.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => DEFAULT_BODY,
        }
    }

    /// Bridge budgets, falling back to the defaults for unset keys.
    pub fn bridge_config(&self) -> BridgeConfig {
        let defaults = BridgeConfig::default();
        BridgeConfig {
            caller_timeout: self
                .bridge_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.caller_timeout),
            probe: ProbeConfig {
                retries: self.probe_retries.unwrap_or(defaults.probe.retries),
                delay: self
                    .probe_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.probe.delay),
            },
        }
    }

    /// Override credentials from `CODEPOST_TOKEN`, `CODEPOST_OWNER` and
    /// `CODEPOST_REPO`.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::apply_env`] with an explicit variable lookup.
    ///
    /// A token given this way counts as verified.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = set("CODEPOST_TOKEN") {
            debug!("github token taken from environment");
            self.github_token = Some(token);
            self.is_authorized = true;
        }
        if let Some(owner) = set("CODEPOST_OWNER") {
            self.github_username = Some(owner);
        }
        if let Some(repo) = set("CODEPOST_REPO") {
            self.github_repo = Some(repo);
        }
        self
    }
}

/// Read access to the settings bag.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, SettingsError>;
}

/// Settings held in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        MemorySettingsStore {
            settings: Mutex::new(settings),
        }
    }

    pub fn set(&self, settings: Settings) {
        if let Ok(mut guard) = self.settings.lock() {
            *guard = settings;
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self
            .settings
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default())
    }
}

/// Settings in a JSON file, optionally overlaid with the environment.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    env_overlay: bool,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSettingsStore {
            path: path.into(),
            env_overlay: false,
        }
    }

    /// Apply [`Settings::apply_env`] after reading the file.
    pub fn with_env_overlay(mut self) -> Self {
        self.env_overlay = true;
        self
    }

    /// `$CODEPOST_SETTINGS`, else `$HOME/.config/codepost/settings.json`.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        if let Ok(path) = std::env::var("CODEPOST_SETTINGS") {
            return Ok(PathBuf::from(path));
        }
        let home = std::env::var_os("HOME").ok_or(SettingsError::NoLocation)?;
        Ok(Path::new(&home)
            .join(".config")
            .join("codepost")
            .join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file as stored, without the environment overlay. A missing
    /// file reads as default settings.
    pub async fn read_file(&self) -> Result<Settings, SettingsError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file; using defaults");
                Ok(Settings::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write `settings` as pretty JSON, creating parent directories.
    pub async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, json).await.map_err(io_err)
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Settings, SettingsError> {
        let settings = self.read_file().await?;
        if self.env_overlay {
            Ok(settings.apply_env())
        } else {
            Ok(settings)
        }
    }
}
