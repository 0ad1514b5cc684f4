//! Keyword spec parsing.
//!
//! Accepts the shorthand users type for "keyword with mention target":
//! `TARIFFS:5`, `TARIFFS+5`, `TARIFFS 5+ times`, `5+ times TARIFFS`, and
//! `TARIFFS+++` (one plus per mention). A bare word gets a target of 1.

use regex::Regex;
use std::sync::LazyLock;

/// Parsed keyword spec: a display name and its mention target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSpec {
    pub name: String,
    pub target: u32,
}

static SPEC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Alternatives are tried left to right; each is fully anchored.
    Regex::new(
        r"^(?:(.*?)\s*[:+](\d+)|(.*?)\s*(\d+)\+\s*(?:times)?|(\d+)\+\s*(?:times)?\s*(.*?)|(.*?)\s*(\++))$",
    )
    .expect("keyword spec pattern is valid")
});

/// Parses one raw spec. Returns `None` when the name is empty.
///
/// Targets that fail to parse or are below 1 fall back to 1.
pub fn parse_spec(raw: &str) -> Option<KeywordSpec> {
    let trimmed = raw.trim();
    let mut name = trimmed.to_string();
    let mut target: u32 = 1;

    if let Some(caps) = SPEC_PATTERN.captures(trimmed) {
        if let (Some(n), Some(t)) = (caps.get(1), caps.get(2)) {
            name = n.as_str().trim().to_string();
            target = t.as_str().parse().unwrap_or(1);
        } else if let (Some(n), Some(t)) = (caps.get(3), caps.get(4)) {
            name = n.as_str().trim().to_string();
            target = t.as_str().parse().unwrap_or(1);
        } else if let (Some(t), Some(n)) = (caps.get(5), caps.get(6)) {
            name = n.as_str().trim().to_string();
            target = t.as_str().parse().unwrap_or(1);
        } else if let (Some(n), Some(pluses)) = (caps.get(7), caps.get(8)) {
            name = n.as_str().trim().to_string();
            target = pluses.as_str().len() as u32;
        }
    }

    if target < 1 {
        target = 1;
    }
    if name.is_empty() {
        return None;
    }

    Some(KeywordSpec { name, target })
}

/// Parses a list of specs separated by newlines or commas.
/// Empty entries are skipped.
pub fn parse_list(input: &str) -> Vec<KeywordSpec> {
    input
        .split(['\n', ','])
        .filter_map(parse_spec)
        .collect()
}
