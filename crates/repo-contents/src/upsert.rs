//! Lookup-then-write of a single file.
//!
//! The contents API refuses to overwrite an existing file unless the write
//! carries the blob `sha` it is replacing. [`UpsertClient::upsert`] therefore
//! performs one lookup to learn that token, then exactly one write that uses
//! it. Nothing is cached between calls: every upsert starts with a fresh
//! lookup, so a token is never reused across requests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ContentsApi, ContentsConfig, RawResponse};
use crate::content::encode_content;
use crate::error::{ContentsError, TransportError};
use crate::outcome::{OutcomeKind, OutcomeNotification};
use crate::request::{FileLocation, PublishRequest};

/// What the lookup learned about the target path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFileState {
    pub exists: bool,
    /// Token required to overwrite; `None` when the file does not exist yet.
    pub version_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

impl RemoteFileState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn existing(token: impl Into<String>) -> Self {
        RemoteFileState {
            exists: true,
            version_token: Some(token.into()),
        }
    }

    /// Interpret a lookup result.
    ///
    /// A transport failure or a non-2xx status both mean "write without a
    /// token"; the write is attempted either way.
    pub fn from_lookup(result: Result<RawResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<ContentsEntry>(&response.body) {
                    Ok(ContentsEntry { sha: Some(sha) }) => Self::existing(sha),
                    _ => {
                        warn!("lookup succeeded but returned no sha; writing without one");
                        RemoteFileState {
                            exists: true,
                            version_token: None,
                        }
                    }
                }
            }
            Ok(response) => {
                debug!(status = response.status, "lookup found no existing file");
                Self::absent()
            }
            Err(e) => {
                debug!(error = %e, "lookup failed; treating file as absent");
                Self::absent()
            }
        }
    }
}

/// JSON body of the write call.
///
/// `sha` is omitted from the serialized form when there is no token, rather
/// than sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePayload {
    pub message: String,
    /// Base64 of the normalized UTF-8 content.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl WritePayload {
    pub fn new(commit_message: &str, content: &str, state: &RemoteFileState) -> Self {
        WritePayload {
            message: commit_message.to_string(),
            content: encode_content(content),
            sha: state.version_token.clone(),
        }
    }
}

/// Create-or-update client for one file per call.
#[derive(Clone)]
pub struct UpsertClient {
    api: Arc<dyn ContentsApi>,
    config: ContentsConfig,
}

impl UpsertClient {
    pub fn new(api: Arc<dyn ContentsApi>, config: ContentsConfig) -> Self {
        UpsertClient { api, config }
    }

    /// Fetch the current state of `location`. Never fails.
    pub async fn lookup(&self, location: &FileLocation) -> RemoteFileState {
        RemoteFileState::from_lookup(self.api.lookup(location).await)
    }

    /// Write `request` to the remote store and report the outcome.
    ///
    /// Safe to repeat sequentially with the same content: the second call's
    /// lookup sees the first call's token. Two concurrent calls for the same
    /// path may read the same token; the store then rejects one of them and
    /// that shows up as a `Failure` outcome.
    pub async fn upsert(&self, request: PublishRequest) -> OutcomeNotification {
        let location = request.location();
        let state = self.lookup(&location).await;
        let payload = WritePayload::new(&request.commit_message, &request.content, &state);

        debug!(
            target_file = %location,
            exists = state.exists,
            "writing file"
        );

        match self.api.write(&location, &payload).await {
            Ok(response) if response.is_success() => {
                info!(target_file = %location, status = response.status, "file committed");
                self.notification(&location, OutcomeKind::Success, None)
            }
            Ok(response) => {
                warn!(
                    target_file = %location,
                    status = response.status,
                    "write rejected by remote store"
                );
                self.notification(&location, OutcomeKind::Failure, Some(response.body))
            }
            Err(e) => {
                warn!(target_file = %location, error = %e, "write failed in transport");
                self.notification(&location, OutcomeKind::TransportError, Some(e.message))
            }
        }
    }

    fn notification(
        &self,
        location: &FileLocation,
        kind: OutcomeKind,
        diagnostic: Option<String>,
    ) -> OutcomeNotification {
        let target_url = match kind {
            OutcomeKind::Success => location.browse_url(&self.config.web_base, &self.config.branch),
            OutcomeKind::Failure => location.issues_url(&self.config.web_base),
            OutcomeKind::TransportError => self.config.status_page.clone(),
        };

        OutcomeNotification {
            kind,
            target_url,
            diagnostic,
            filename: location.filename.clone(),
            repository: location.repository(),
        }
    }
}

/// Check that the credential behind `api` can read `owner/repo`.
pub async fn verify_access(
    api: &dyn ContentsApi,
    owner: &str,
    repo: &str,
) -> Result<(), ContentsError> {
    let response = api.repository_root(owner, repo).await?;
    if response.is_success() {
        return Ok(());
    }

    let message = serde_json::from_str::<ApiMessage>(&response.body)
        .map(|m| m.message)
        .unwrap_or(response.body);

    Err(ContentsError::AccessDenied {
        repository: format!("{}/{}", owner, repo),
        status: response.status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_with_sha_captures_token() {
        let state = RemoteFileState::from_lookup(Ok(RawResponse::new(
            200,
            r#"{"name":"a.py","sha":"abc123","size":12}"#,
        )));
        assert_eq!(state, RemoteFileState::existing("abc123"));
    }

    #[test]
    fn test_lookup_404_is_absent() {
        let state =
            RemoteFileState::from_lookup(Ok(RawResponse::new(404, r#"{"message":"Not Found"}"#)));
        assert_eq!(state, RemoteFileState::absent());
    }

    #[test]
    fn test_lookup_transport_error_is_absent() {
        let state = RemoteFileState::from_lookup(Err(TransportError::new("connection reset")));
        assert!(!state.exists);
        assert!(state.version_token.is_none());
    }

    #[test]
    fn test_lookup_directory_listing_exists_without_token() {
        let state = RemoteFileState::from_lookup(Ok(RawResponse::new(200, "[]")));
        assert!(state.exists);
        assert!(state.version_token.is_none());
    }

    #[test]
    fn test_payload_without_token_omits_sha_field() {
        let payload = WritePayload::new("msg", "body", &RemoteFileState::absent());
        let json = serde_json::to_value(&payload).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("sha"));
        assert_eq!(obj["message"], "msg");
        assert_eq!(obj["content"], "Ym9keQ==");
    }

    #[test]
    fn test_payload_with_token_carries_it() {
        let payload = WritePayload::new("msg", "body", &RemoteFileState::existing("abc123"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn test_payload_content_is_normalized_before_encoding() {
        let payload = WritePayload::new("msg", "a\r\nb\u{00A0}c", &RemoteFileState::absent());
        assert_eq!(
            crate::content::decode_content(&payload.content).as_deref(),
            Some("a\nb c")
        );
    }
}
