//! Line grammar for batch replace scripts.
//!
//! Each instruction form is a regex anchored to the whole (already trimmed)
//! line. Forms are tried in declaration order and the first match wins, so a
//! line such as `in = "x"` classifies as an `in` instruction rather than a
//! variable assignment.
//!
//! | Form            | Pattern                         |
//! |-----------------|---------------------------------|
//! | `filter`        | `filter <glob>`                 |
//! | `in`            | `in <glob>`                     |
//! | `replace`       | `replace "<literal>"`           |
//! | `replace-regex` | `replace-regex "<regex>"`       |
//! | `with`          | `with "<template>"`             |
//! | variable        | `<name> = "<value>"`            |
//!
//! Variable names are ASCII letters, digits and underscores.
//!
//! Quoted payloads are greedy: everything between the first quote after the
//! keyword and the last quote on the line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker that starts a comment line.
pub const COMMENT_PREFIX: &str = "//";

static FILTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^filter\s+(.*)$").unwrap());
static IN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^in\s+(.*)$").unwrap());
static REPLACE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^replace\s+"(.*)"$"#).unwrap());
static REPLACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^replace-regex\s+"(.*)"$"#).unwrap());
static WITH: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^with\s+"(.*)"$"#).unwrap());
static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([A-Za-z0-9_]+)\s*=\s*"(.*)"$"#).unwrap());

/// A classified script line with its raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    Filter(&'a str),
    In(&'a str),
    Replace(&'a str),
    ReplaceRegex(&'a str),
    With(&'a str),
    Variable { name: &'a str, value: &'a str },
    Unrecognized,
}

/// Returns true for lines the parser skips before classification.
pub fn is_ignorable(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT_PREFIX)
}

/// Classifies one trimmed, non-empty, non-comment line.
pub fn classify(line: &str) -> Instruction<'_> {
    if let Some(payload) = capture(&FILTER, line) {
        return Instruction::Filter(payload);
    }
    if let Some(payload) = capture(&IN, line) {
        return Instruction::In(payload);
    }
    if let Some(payload) = capture(&REPLACE, line) {
        return Instruction::Replace(payload);
    }
    if let Some(payload) = capture(&REPLACE_REGEX, line) {
        return Instruction::ReplaceRegex(payload);
    }
    if let Some(payload) = capture(&WITH, line) {
        return Instruction::With(payload);
    }
    if let Some(caps) = VARIABLE.captures(line) {
        if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
            return Instruction::Variable {
                name: name.as_str(),
                value: value.as_str(),
            };
        }
    }
    Instruction::Unrecognized
}

fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Normalizes a `filter`/`in` payload: trims it and strips one pair of
/// surrounding double quotes.
pub fn glob_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(trimmed)
}
