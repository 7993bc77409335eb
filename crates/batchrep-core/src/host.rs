//! Capabilities the rewrite engine needs from its environment.
//!
//! The engine never touches the filesystem or the user directly. Everything
//! goes through a [`Host`]: where the script comes from, how a glob becomes a
//! set of files, how files are read and written, and where messages are shown.
//!
//! Two implementations ship with this crate:
//!
//! - [`FsHost`](crate::fs_host::FsHost) - files under a root directory
//! - [`MemoryHost`](crate::memory_host::MemoryHost) - an in-memory file map
//!
//! Both resolve patterns with [`compile_glob`], so a script behaves the same
//! on either.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::error::HostError;

#[async_trait]
pub trait Host: Send + Sync {
    /// Whether there is any location changes can be applied to.
    fn has_writable_target(&self) -> bool;

    /// Returns the script source.
    async fn script_text(&self) -> Result<String, HostError>;

    /// Resolves a glob-style pattern to the set of matching file paths.
    async fn find_file_paths(&self, pattern: &str) -> Result<BTreeSet<PathBuf>, HostError>;

    /// Returns the current content of a file.
    async fn read_file(&self, path: &Path) -> Result<String, HostError>;

    /// Persists new content for a file.
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), HostError>;

    /// Shows an error message to the user.
    fn report_error(&self, message: &str);

    /// Shows an informational message to the user.
    fn report_info(&self, message: &str);
}

/// Builds a glob for matching root-relative paths.
///
/// `*` and `?` stay inside one path component, `**` crosses directories and
/// `{a,b}` is an alternation.
fn build_glob(pattern: &str) -> Result<Glob, HostError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| HostError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

/// Compiles a single discovery pattern.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, HostError> {
    Ok(build_glob(pattern)?.compile_matcher())
}

/// Compiles a list of patterns into one set, as used for excludes.
pub fn compile_glob_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, HostError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(build_glob(pattern.as_ref())?);
    }
    builder.build().map_err(|e| HostError::InvalidGlob {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        message: e.kind().to_string(),
    })
}
