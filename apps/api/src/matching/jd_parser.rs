//! JD Parser: extracts role title and skill sections from raw job-description text.
//!
//! Best-effort heuristic, not a grammar. Malformed input never errors; the worst case is
//! a `JobRequirement` with both skill lists empty.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_ROLE: &str = "Unknown Role";

/// Structured requirements for one job description. Skill order follows the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub role_title: String,
    pub must_have: Vec<String>,
    pub good_to_have: Vec<String>,
}

impl JobRequirement {
    /// All skills, must-have first, in source order.
    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.must_have
            .iter()
            .chain(self.good_to_have.iter())
            .map(String::as_str)
    }

    pub fn skill_count(&self) -> usize {
        self.must_have.len() + self.good_to_have.len()
    }
}

/// Scanner state: which skill list bullets are currently appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Must,
    Good,
}

/// What a single (trimmed, non-blank) line means to the scanner.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Header(Section),
    Bullet(&'a str),
    Other,
}

fn classify(line: &str) -> LineKind<'_> {
    let lower = line.to_lowercase();
    if lower.contains("must") {
        return LineKind::Header(Section::Must);
    }
    if lower.contains("good") || lower.contains("nice") {
        return LineKind::Header(Section::Good);
    }
    if line.starts_with('-') || line.starts_with('*') {
        let item = line
            .trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace())
            .trim();
        return LineKind::Bullet(item);
    }
    LineKind::Other
}

/// Parses raw JD text into a `JobRequirement`. Pure and idempotent.
///
/// The first non-blank line is the role title. Remaining lines drive a three-state scanner:
/// a line mentioning "must" opens the must-have section, one mentioning "good" or "nice"
/// opens the good-to-have section (header lines are not skills), and `-`/`*` bullets are
/// appended to the open section. Bullets before any header and all other lines are ignored.
pub fn parse_jd(jd_text: &str) -> JobRequirement {
    let mut lines = jd_text.lines().map(str::trim).filter(|l| !l.is_empty());

    let role_title = lines
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_ROLE.to_string());

    let mut must_have = Vec::new();
    let mut good_to_have = Vec::new();
    let mut section = Section::None;

    for line in lines {
        match classify(line) {
            LineKind::Header(next) => section = next,
            LineKind::Bullet(item) if !item.is_empty() => match section {
                Section::Must => must_have.push(item.to_string()),
                Section::Good => good_to_have.push(item.to_string()),
                Section::None => {}
            },
            LineKind::Bullet(_) | LineKind::Other => {}
        }
    }

    JobRequirement {
        role_title,
        must_have,
        good_to_have,
    }
}
