//! In-memory fake of the contents API (testing only)
//!
//! `MemoryContentsApi` keeps files in a `HashMap<path, StoredFile>` and applies
//! the same optimistic-concurrency rules as the real store:
//!
//! - create (no file, no sha) → 201
//! - update with the current sha → 200
//! - update of an existing file without a sha → 422
//! - update with a stale sha → 409
//!
//! Every call is recorded, and responses can be scripted to simulate
//! rejections and network failures.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::api::{ContentsApi, RawResponse};
use crate::error::TransportError;
use crate::request::FileLocation;
use crate::upsert::WritePayload;

/// A file held by the fake store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Base64 content exactly as written.
    pub content: String,
    pub sha: String,
}

/// One call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Lookup { path: String },
    Write { path: String, payload: WritePayload },
    RepositoryRoot { repository: String },
}

/// Scripted answer for the next lookup or write.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(RawResponse),
    Transport(String),
}

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<String, StoredFile>,
    calls: Vec<RecordedCall>,
    lookup_script: VecDeque<Scripted>,
    write_script: VecDeque<Scripted>,
    repositories: Vec<String>,
}

/// In-memory contents API.
#[derive(Debug, Default)]
pub struct MemoryContentsApi {
    inner: Mutex<Inner>,
}

fn blob_sha(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())[..40].to_string()
}

impl MemoryContentsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with a known sha.
    pub fn with_file(self, location: &FileLocation, content: &str, sha: &str) -> Self {
        self.inner.lock().unwrap().files.insert(
            location.contents_path(),
            StoredFile {
                content: content.to_string(),
                sha: sha.to_string(),
            },
        );
        self
    }

    /// Make `owner/repo` visible to `repository_root`.
    pub fn with_repository(self, owner: &str, repo: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .repositories
            .push(format!("{}/{}", owner, repo));
        self
    }

    /// Answer the next lookup with `scripted` instead of consulting the store.
    pub fn script_lookup(&self, scripted: Scripted) {
        self.inner.lock().unwrap().lookup_script.push_back(scripted);
    }

    /// Answer the next write with `scripted` instead of applying it.
    pub fn script_write(&self, scripted: Scripted) {
        self.inner.lock().unwrap().write_script.push_back(scripted);
    }

    pub fn file(&self, location: &FileLocation) -> Option<StoredFile> {
        self.inner
            .lock()
            .unwrap()
            .files
            .get(&location.contents_path())
            .cloned()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Payloads of every write, in call order.
    pub fn write_payloads(&self) -> Vec<WritePayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCall::Write { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn answer(scripted: Scripted) -> Result<RawResponse, TransportError> {
        match scripted {
            Scripted::Respond(response) => Ok(response),
            Scripted::Transport(message) => Err(TransportError::new(message)),
        }
    }
}

#[async_trait]
impl ContentsApi for MemoryContentsApi {
    async fn lookup(&self, location: &FileLocation) -> Result<RawResponse, TransportError> {
        let path = location.contents_path();
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall::Lookup { path: path.clone() });

        if let Some(scripted) = inner.lookup_script.pop_front() {
            return Self::answer(scripted);
        }

        match inner.files.get(&path) {
            Some(file) => Ok(RawResponse::new(
                200,
                json!({
                    "name": location.filename,
                    "path": location.file_path(),
                    "sha": file.sha,
                    "content": file.content,
                    "encoding": "base64",
                })
                .to_string(),
            )),
            None => Ok(RawResponse::new(404, json!({"message": "Not Found"}).to_string())),
        }
    }

    async fn write(
        &self,
        location: &FileLocation,
        payload: &WritePayload,
    ) -> Result<RawResponse, TransportError> {
        let path = location.contents_path();
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall::Write {
            path: path.clone(),
            payload: payload.clone(),
        });

        if let Some(scripted) = inner.write_script.pop_front() {
            return Self::answer(scripted);
        }

        let current = inner.files.get(&path).map(|f| f.sha.clone());
        let status = match (current, payload.sha.as_deref()) {
            (None, None) => 201,
            (None, Some(_)) => {
                return Ok(RawResponse::new(
                    404,
                    json!({"message": "Not Found"}).to_string(),
                ))
            }
            (Some(_), None) => {
                return Ok(RawResponse::new(
                    422,
                    json!({"message": "Invalid request.\n\n\"sha\" wasn't supplied."}).to_string(),
                ))
            }
            (Some(current), Some(given)) if current != given => {
                return Ok(RawResponse::new(
                    409,
                    json!({"message": format!("{} does not match {}", location.file_path(), given)})
                        .to_string(),
                ))
            }
            (Some(_), Some(_)) => 200,
        };

        let sha = blob_sha(&payload.content);
        inner.files.insert(
            path,
            StoredFile {
                content: payload.content.clone(),
                sha: sha.clone(),
            },
        );

        Ok(RawResponse::new(
            status,
            json!({"content": {"path": location.file_path(), "sha": sha}}).to_string(),
        ))
    }

    async fn repository_root(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RawResponse, TransportError> {
        let repository = format!("{}/{}", owner, repo);
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall::RepositoryRoot {
            repository: repository.clone(),
        });

        if inner.repositories.contains(&repository) {
            Ok(RawResponse::new(200, "[]"))
        } else {
            Ok(RawResponse::new(404, json!({"message": "Not Found"}).to_string()))
        }
    }
}
