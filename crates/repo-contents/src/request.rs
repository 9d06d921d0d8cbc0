//! Publish requests and the remote location they address.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

/// Bytes escaped inside a single path segment. `/` is included so a segment
/// can never introduce an extra level.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// One fully-assembled publish: what to write, where, and with which message.
///
/// Built by the orchestrator from rendered templates, owned by a single
/// publish attempt, and consumed by [`crate::UpsertClient::upsert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub content: String,
    pub commit_message: String,
    pub target_owner: String,
    pub target_repo: String,
    pub target_path: String,
    pub target_filename: String,
}

impl PublishRequest {
    /// The remote file this request addresses.
    pub fn location(&self) -> FileLocation {
        FileLocation::new(
            &self.target_owner,
            &self.target_repo,
            &self.target_path,
            &self.target_filename,
        )
    }
}

/// `{owner}/{repo}/{path}/{filename}` in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub filename: String,
}

impl FileLocation {
    pub fn new(owner: &str, repo: &str, path: &str, filename: &str) -> Self {
        FileLocation {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.trim_matches('/').to_string(),
            filename: filename.trim_matches('/').to_string(),
        }
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Path of the file inside the repository (`path/filename`, or just the
    /// filename when no folder is set).
    pub fn file_path(&self) -> String {
        if self.path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.path, self.filename)
        }
    }

    /// `file_path` with every segment percent-encoded; separators are kept.
    pub fn encoded_file_path(&self) -> String {
        self.file_path()
            .split('/')
            .map(encode_segment)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// API path relative to the API base: `repos/{owner}/{repo}/contents/{path}/{filename}`,
    /// percent-encoded per segment.
    pub fn contents_path(&self) -> String {
        format!(
            "repos/{}/{}/contents/{}",
            encode_segment(&self.owner),
            encode_segment(&self.repo),
            self.encoded_file_path()
        )
    }

    /// Browseable URL of the file on the given branch.
    pub fn browse_url(&self, web_base: &str, branch: &str) -> String {
        format!(
            "{}/{}/{}/tree/{}/{}",
            web_base.trim_end_matches('/'),
            encode_segment(&self.owner),
            encode_segment(&self.repo),
            encode_segment(branch),
            self.encoded_file_path()
        )
    }

    /// Issue tracker of the repository.
    pub fn issues_url(&self, web_base: &str) -> String {
        format!(
            "{}/{}/{}/issues",
            web_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

impl std::fmt::Display for FileLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.repository(), self.file_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_path_joins_folder_and_file() {
        let loc = FileLocation::new("octo", "solutions", "Leetcode", "01-02-2025_1.py");
        assert_eq!(
            loc.contents_path(),
            "repos/octo/solutions/contents/Leetcode/01-02-2025_1.py"
        );
    }

    #[test]
    fn test_surrounding_slashes_are_trimmed() {
        let loc = FileLocation::new("octo", "solutions", "/Leetcode/easy/", "a.py");
        assert_eq!(loc.file_path(), "Leetcode/easy/a.py");
    }

    #[test]
    fn test_empty_folder_addresses_repository_root() {
        let loc = FileLocation::new("octo", "solutions", "", "a.py");
        assert_eq!(loc.contents_path(), "repos/octo/solutions/contents/a.py");
    }

    #[test]
    fn test_browse_and_issue_urls() {
        let loc = FileLocation::new("octo", "solutions", "Leetcode", "a.py");
        assert_eq!(
            loc.browse_url("https://github.com/", "main"),
            "https://github.com/octo/solutions/tree/main/Leetcode/a.py"
        );
        assert_eq!(
            loc.issues_url("https://github.com"),
            "https://github.com/octo/solutions/issues"
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped_per_segment() {
        let loc = FileLocation::new("octo", "sol", "Leetcode/C# tips", "C# notes?.cs");
        assert_eq!(
            loc.contents_path(),
            "repos/octo/sol/contents/Leetcode/C%23%20tips/C%23%20notes%3F.cs"
        );
        assert_eq!(
            loc.browse_url("https://github.com", "main"),
            "https://github.com/octo/sol/tree/main/Leetcode/C%23%20tips/C%23%20notes%3F.cs"
        );
        // the raw path is still what the user sees
        assert_eq!(loc.file_path(), "Leetcode/C# tips/C# notes?.cs");
    }

    #[test]
    fn test_request_location() {
        let req = PublishRequest {
            content: "x".to_string(),
            commit_message: "m".to_string(),
            target_owner: "octo".to_string(),
            target_repo: "solutions".to_string(),
            target_path: "Leetcode".to_string(),
            target_filename: "a.py".to_string(),
        };
        assert_eq!(req.location().to_string(), "octo/solutions/Leetcode/a.py");
    }
}
