//! Placeholder substitution.
//!
//! A template is plain text with `<TOKEN>` markers. Rendering is one
//! left-to-right scan: each recognized token is replaced by its fact value
//! and the scan resumes after the token, so substituted text is never
//! scanned again. Unrecognized `<...>` text is copied through.

use std::borrow::Cow;

use crate::facts::FactSheet;

/// A recognized template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    FullDate,
    DayMonth,
    MonthYear,
    MonthShortYear,
    Year,
    Month,
    Day,
    Url,
    ProblemName,
    ProblemNo,
    Difficulty,
    Lang,
    Code,
}

impl Placeholder {
    pub const ALL: [Placeholder; 13] = [
        Placeholder::FullDate,
        Placeholder::DayMonth,
        Placeholder::MonthYear,
        Placeholder::MonthShortYear,
        Placeholder::Year,
        Placeholder::Month,
        Placeholder::Day,
        Placeholder::Url,
        Placeholder::ProblemName,
        Placeholder::ProblemNo,
        Placeholder::Difficulty,
        Placeholder::Lang,
        Placeholder::Code,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::FullDate => "<DD-MM-YYYY>",
            Placeholder::DayMonth => "<DD-MM>",
            Placeholder::MonthYear => "<MM-YYYY>",
            Placeholder::MonthShortYear => "<MM-YY>",
            Placeholder::Year => "<YYYY>",
            Placeholder::Month => "<MM>",
            Placeholder::Day => "<DD>",
            Placeholder::Url => "<URL>",
            Placeholder::ProblemName => "<PROBLEM_NAME>",
            Placeholder::ProblemNo => "<PROBLEM_NO>",
            Placeholder::Difficulty => "<DIFFICULTY>",
            Placeholder::Lang => "<LANG>",
            Placeholder::Code => "<CODE>",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Placeholder::FullDate => "current date (UTC), e.g. 18-10-2026",
            Placeholder::DayMonth => "day and month, e.g. 18-10",
            Placeholder::MonthYear => "month and year, e.g. 10-2026",
            Placeholder::MonthShortYear => "month and two-digit year, e.g. 10-26",
            Placeholder::Year => "four-digit year",
            Placeholder::Month => "two-digit month",
            Placeholder::Day => "two-digit day",
            Placeholder::Url => "problem URL",
            Placeholder::ProblemName => "problem title, e.g. Two Sum",
            Placeholder::ProblemNo => "problem number, e.g. 1",
            Placeholder::Difficulty => "difficulty label, e.g. Easy",
            Placeholder::Lang => "editor language, e.g. Python3",
            Placeholder::Code => "the solution source code",
        }
    }

    pub fn value<'a>(&self, facts: &'a FactSheet) -> Cow<'a, str> {
        match self {
            Placeholder::FullDate => Cow::Owned(facts.full_date()),
            Placeholder::DayMonth => Cow::Owned(facts.day_month()),
            Placeholder::MonthYear => Cow::Owned(facts.month_year()),
            Placeholder::MonthShortYear => Cow::Owned(facts.month_short_year()),
            Placeholder::Year => Cow::Owned(facts.year()),
            Placeholder::Month => Cow::Owned(facts.month()),
            Placeholder::Day => Cow::Owned(facts.day()),
            Placeholder::Url => Cow::Borrowed(facts.url()),
            Placeholder::ProblemName => Cow::Borrowed(facts.problem_name()),
            Placeholder::ProblemNo => Cow::Borrowed(facts.problem_no()),
            Placeholder::Difficulty => Cow::Borrowed(facts.difficulty()),
            Placeholder::Lang => Cow::Borrowed(facts.language()),
            Placeholder::Code => Cow::Borrowed(facts.code()),
        }
    }

    /// The token `text` starts with, if any.
    fn at_start(text: &str) -> Option<Placeholder> {
        Self::ALL.into_iter().find(|p| text.starts_with(p.token()))
    }
}

/// Substitute every recognized token. With `include_code == false` the
/// `<CODE>` token is left in place.
pub fn render(template: &str, facts: &FactSheet, include_code: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match Placeholder::at_start(tail) {
            Some(Placeholder::Code) if !include_code => {
                out.push_str(Placeholder::Code.token());
                rest = &tail[Placeholder::Code.token().len()..];
            }
            Some(placeholder) => {
                out.push_str(&placeholder.value(facts));
                rest = &tail[placeholder.token().len()..];
            }
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render a file body. A body template without `<CODE>` gets the code
/// appended after a blank line.
pub fn render_body(template: &str, facts: &FactSheet) -> String {
    if template.contains(Placeholder::Code.token()) {
        render(template, facts, true)
    } else {
        let mut body = render(template, facts, false);
        body.push_str("\n\n");
        body.push_str(facts.code());
        body
    }
}
