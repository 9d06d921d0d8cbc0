//! The user-editable commit draft and its validation.

use async_trait::async_trait;
use repo_contents::PublishRequest;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::settings::DEFAULT_PATH;

/// What the user is asked to confirm. Every field may be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    /// `owner/repo`, or a bare `repo` meaning the configured owner
    pub repository: String,
    pub path: String,
    pub filename: String,
    pub commit_message: String,
    pub content: String,
}

impl RequestDraft {
    /// Turn a confirmed draft into a request.
    ///
    /// `owner` is used when the repository field names no owner;
    /// `fallback_path` when the path field is empty.
    pub fn into_request(
        self,
        owner: &str,
        fallback_path: &str,
    ) -> Result<PublishRequest, ValidationError> {
        let filename = self.filename.trim();
        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        let commit_message = self.commit_message.trim();
        if commit_message.is_empty() {
            return Err(ValidationError::EmptyCommitMessage);
        }

        let (target_owner, target_repo) = split_repository(&self.repository, owner)?;

        let path = self.path.trim().trim_matches('/');
        let target_path = if !path.is_empty() {
            path
        } else {
            match fallback_path.trim().trim_matches('/') {
                "" => DEFAULT_PATH,
                fallback => fallback,
            }
        };

        Ok(PublishRequest {
            content: self.content,
            commit_message: commit_message.to_string(),
            target_owner,
            target_repo,
            target_path: target_path.to_string(),
            target_filename: filename.to_string(),
        })
    }
}

/// `owner/repo[/...]` splits at the first slash and ignores anything past
/// the second segment; a bare `repo` takes `default_owner`.
fn split_repository(
    repository: &str,
    default_owner: &str,
) -> Result<(String, String), ValidationError> {
    let value = repository.trim();
    let (owner, repo) = match value.split_once('/') {
        Some((owner, rest)) => (owner.trim(), rest.split('/').next().unwrap_or("").trim()),
        None => (default_owner.trim(), value),
    };

    if owner.is_empty() || repo.is_empty() {
        return Err(ValidationError::InvalidRepository(repository.to_string()));
    }
    Ok((owner.to_string(), repo.to_string()))
}

/// Shows a draft to the user. `None` means the user dismissed it.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, draft: RequestDraft) -> Option<RequestDraft>;
}

/// Accepts every draft unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, draft: RequestDraft) -> Option<RequestDraft> {
        Some(draft)
    }
}
