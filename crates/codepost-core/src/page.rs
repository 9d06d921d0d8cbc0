//! Problem details read from the host page.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What the page says about the problem being solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFacts {
    pub problem_no: String,
    pub problem_name: String,
    pub difficulty: String,
    /// Language selected in the editor, as displayed (`Python3`, `C++`...)
    pub language: String,
    /// Canonical problem URL
    pub url: String,
}

impl ProblemFacts {
    /// Build facts from the raw strings shown on the page.
    ///
    /// `title` is the header text (`"1. Two Sum"`); `url` is the current
    /// location, which is canonicalized.
    pub fn from_page(title: &str, difficulty: &str, language: &str, url: &str) -> Self {
        let (problem_no, problem_name) = parse_title(title);
        ProblemFacts {
            problem_no,
            problem_name,
            difficulty: difficulty.trim().to_string(),
            language: language.trim().to_string(),
            url: canonical_problem_url(url),
        }
    }
}

/// Split `"<no>. <name>"` at the first dot.
///
/// A title without a dot is taken as the number alone, with an empty name.
pub fn parse_title(title: &str) -> (String, String) {
    match title.trim().split_once('.') {
        Some((no, name)) => (no.trim().to_string(), name.trim().to_string()),
        None => (title.trim().to_string(), String::new()),
    }
}

const PROBLEM_URL_PATTERN: &str = r"(https://leetcode\.com/problems/[^/]+).*";

fn problem_url_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PROBLEM_URL_PATTERN)).as_ref().ok()
}

/// Drop everything after the problem slug (`/description/`, query, hash).
/// URLs that are not problem pages are returned unchanged.
pub fn canonical_problem_url(url: &str) -> String {
    let url = url.trim();
    match problem_url_regex() {
        Some(re) => re.replace(url, "$1").into_owned(),
        None => url.to_string(),
    }
}

/// Source of [`ProblemFacts`] for the current page.
#[async_trait]
pub trait PageFactsProvider: Send + Sync {
    async fn read_problem_facts(&self) -> anyhow::Result<ProblemFacts>;
}

/// Facts supplied up front by the caller.
#[derive(Debug, Clone)]
pub struct StaticPageFacts {
    facts: ProblemFacts,
}

impl StaticPageFacts {
    pub fn new(facts: ProblemFacts) -> Self {
        StaticPageFacts { facts }
    }
}

#[async_trait]
impl PageFactsProvider for StaticPageFacts {
    async fn read_problem_facts(&self) -> anyhow::Result<ProblemFacts> {
        Ok(self.facts.clone())
    }
}
