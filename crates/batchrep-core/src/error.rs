//! Error types for script parsing, host access and batch execution.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Keywords that start or complete a command block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Filter,
    In,
    Replace,
    ReplaceRegex,
    With,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Filter => "filter",
            Keyword::In => "in",
            Keyword::Replace => "replace",
            Keyword::ReplaceRegex => "replace-regex",
            Keyword::With => "with",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntax errors raised while parsing a script.
///
/// Every variant carries the 1-based line number and the trimmed text of
/// the offending line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A keyword appeared where the block state does not allow it.
    #[error("Unexpected '{keyword}' instruction at line {line}: {text}")]
    Unexpected {
        keyword: Keyword,
        line: usize,
        text: String,
    },

    /// A `filter` or `in` instruction with an empty glob.
    #[error("Invalid '{keyword}' instruction at line {line}: {text}")]
    Invalid {
        keyword: Keyword,
        line: usize,
        text: String,
    },

    /// A variable assignment outside the front matter.
    #[error("Unexpected variable at line {line}: {text}")]
    UnexpectedVariable { line: usize, text: String },

    /// A line matching none of the instruction forms.
    #[error("Unrecognized instruction at line {line}: {text}")]
    Unrecognized { line: usize, text: String },
}

impl ScriptError {
    /// The 1-based line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Unexpected { line, .. }
            | ScriptError::Invalid { line, .. }
            | ScriptError::UnexpectedVariable { line, .. }
            | ScriptError::Unrecognized { line, .. } => *line,
        }
    }
}

/// Errors surfaced by a [`Host`](crate::host::Host) implementation.
#[derive(Error, Debug)]
pub enum HostError {
    /// The script source could not be obtained.
    #[error("{0}")]
    ScriptUnavailable(String),

    /// A discovery pattern is not a valid glob.
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// A requested file is not known to the host.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An I/O error while reading or writing a file.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Terminal failure of a batch replace run.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// There is no location the batch could be applied to.
    #[error("No writable target to apply changes to")]
    NoWritableTarget,

    /// The script failed to parse.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// A `replace-regex` pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The host failed to provide or persist data.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ReplaceError {
    /// Process exit code for command-line front-ends.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReplaceError::InvalidPattern { .. } => 1,
            ReplaceError::Script(_) => 2,
            ReplaceError::NoWritableTarget => 3,
            ReplaceError::Host(HostError::ScriptUnavailable(_)) => 3,
            ReplaceError::Host(_) => 4,
        }
    }
}
