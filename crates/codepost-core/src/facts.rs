//! Per-attempt snapshot of everything a template can reference.

use chrono::{NaiveDate, Utc};

use crate::page::ProblemFacts;

/// Immutable facts for one publish attempt.
///
/// Built once, after extraction, from the problem facts, the extracted code
/// and the current UTC date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSheet {
    date: NaiveDate,
    url: String,
    problem_no: String,
    problem_name: String,
    difficulty: String,
    language: String,
    code: String,
}

impl FactSheet {
    pub fn new(date: NaiveDate, problem: &ProblemFacts, code: impl Into<String>) -> Self {
        FactSheet {
            date,
            url: problem.url.clone(),
            problem_no: problem.problem_no.clone(),
            problem_name: problem.problem_name.clone(),
            difficulty: problem.difficulty.clone(),
            language: problem.language.clone(),
            code: code.into(),
        }
    }

    /// Facts dated today (UTC).
    pub fn capture(problem: &ProblemFacts, code: impl Into<String>) -> Self {
        Self::new(Utc::now().date_naive(), problem, code)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `DD-MM-YYYY`
    pub fn full_date(&self) -> String {
        self.date.format("%d-%m-%Y").to_string()
    }

    /// `DD-MM`
    pub fn day_month(&self) -> String {
        self.date.format("%d-%m").to_string()
    }

    /// `MM-YYYY`
    pub fn month_year(&self) -> String {
        self.date.format("%m-%Y").to_string()
    }

    /// `MM-YY`
    pub fn month_short_year(&self) -> String {
        self.date.format("%m-%y").to_string()
    }

    pub fn year(&self) -> String {
        self.date.format("%Y").to_string()
    }

    pub fn month(&self) -> String {
        self.date.format("%m").to_string()
    }

    pub fn day(&self) -> String {
        self.date.format("%d").to_string()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn problem_no(&self) -> &str {
        &self.problem_no
    }

    pub fn problem_name(&self) -> &str {
        &self.problem_name
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> ProblemFacts {
        ProblemFacts::from_page("1. Two Sum", "Easy", "Python3", "https://x/problems/two-sum")
    }

    #[test]
    fn test_date_strings_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let facts = FactSheet::new(date, &problem(), "");

        assert_eq!(facts.full_date(), "07-03-2024");
        assert_eq!(facts.day_month(), "07-03");
        assert_eq!(facts.month_year(), "03-2024");
        assert_eq!(facts.month_short_year(), "03-24");
        assert_eq!(facts.year(), "2024");
        assert_eq!(facts.month(), "03");
        assert_eq!(facts.day(), "07");
    }

    #[test]
    fn test_capture_uses_today_utc() {
        let before = Utc::now().date_naive();
        let facts = FactSheet::capture(&problem(), "pass");
        let after = Utc::now().date_naive();

        assert!(facts.date() >= before && facts.date() <= after);
        assert_eq!(facts.code(), "pass");
        assert_eq!(facts.problem_no(), "1");
    }
}
