//! Parsed representation of a batch replace script.

use std::fmt;

/// File pattern used when a script has no `filter` or a block has no `in`.
pub const DEFAULT_FILE_PATTERN: &str = "**/*";

/// A front-matter variable with its fully resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

/// One completed `in`/`replace`/`with` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceCommand {
    /// Glob selecting the files this command applies to.
    pub in_pattern: String,
    /// Search pattern, literal or regex source.
    pub replace: String,
    /// Replacement template.
    pub with: String,
    pub as_regex: bool,
}

impl ReplaceCommand {
    pub fn mode(&self) -> &'static str {
        if self.as_regex {
            "replace-regex"
        } else {
            "replace"
        }
    }
}

impl fmt::Display for ReplaceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "in {} {} \"{}\" with \"{}\"",
            self.in_pattern,
            self.mode(),
            self.replace,
            self.with
        )
    }
}

/// The terminal artifact of parsing: a filter plus ordered commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub filter: String,
    pub replace_commands: Vec<ReplaceCommand>,
}

impl Script {
    pub fn is_empty(&self) -> bool {
        self.replace_commands.is_empty()
    }
}

impl Default for Script {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILE_PATTERN.to_string(),
            replace_commands: Vec::new(),
        }
    }
}
