//! In-memory [`Host`] implementation.
//!
//! Holds a map of relative paths to contents and records every write and
//! message, which makes it the natural host for tests and for callers that
//! want to preview a batch without touching disk.
//!
//! # Example
//!
//! ```no_run
//! use batchrep_core::memory_host::MemoryHost;
//! use batchrep_core::replacer::BatchReplacer;
//!
//! # async fn demo() {
//! let host = MemoryHost::new("replace \"brown\"\nwith \"red\"")
//!     .with_file("fox.txt", "The quick brown fox");
//! BatchReplacer::batch_replace(&host).await.ok();
//! assert_eq!(host.written("fox.txt").as_deref(), Some("The quick red fox"));
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::HostError;
use crate::host::{compile_glob, Host};

/// A host whose files live in memory.
#[derive(Debug)]
pub struct MemoryHost {
    script: Option<String>,
    writable: bool,
    files: Mutex<BTreeMap<PathBuf, String>>,
    failing_reads: BTreeSet<PathBuf>,
    failing_writes: BTreeSet<PathBuf>,
    written: Mutex<BTreeMap<PathBuf, String>>,
    reads: Mutex<Vec<PathBuf>>,
    errors: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
}

impl MemoryHost {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: Some(script.into()),
            writable: true,
            files: Mutex::new(BTreeMap::new()),
            failing_reads: BTreeSet::new(),
            failing_writes: BTreeSet::new(),
            written: Mutex::new(BTreeMap::new()),
            reads: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
        }
    }

    /// A host with no script source.
    pub fn without_script() -> Self {
        Self {
            script: None,
            ..Self::new(String::new())
        }
    }

    /// Adds a file.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        lock(&self.files).insert(path.into(), content.into());
        self
    }

    /// Marks the host as having nowhere to write.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Makes every read of `path` fail with an I/O error.
    pub fn fail_reads_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_reads.insert(path.into());
        self
    }

    /// Makes every write to `path` fail with an I/O error.
    pub fn fail_writes_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_writes.insert(path.into());
        self
    }

    /// Current content of a file, including any writes.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        lock(&self.files).get(path.as_ref()).cloned()
    }

    /// Content written to a path during this host's lifetime, if any.
    pub fn written(&self, path: impl AsRef<Path>) -> Option<String> {
        lock(&self.written).get(path.as_ref()).cloned()
    }

    /// Every path written, with its last written content.
    pub fn written_files(&self) -> BTreeMap<PathBuf, String> {
        lock(&self.written).clone()
    }

    /// How many times a path was read.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        lock(&self.reads)
            .iter()
            .filter(|p| p.as_path() == path.as_ref())
            .count()
    }

    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }

    pub fn infos(&self) -> Vec<String> {
        lock(&self.infos).clone()
    }
}

#[async_trait]
impl Host for MemoryHost {
    fn has_writable_target(&self) -> bool {
        self.writable
    }

    async fn script_text(&self) -> Result<String, HostError> {
        self.script
            .clone()
            .ok_or_else(|| HostError::ScriptUnavailable("No script text available".to_string()))
    }

    async fn find_file_paths(&self, pattern: &str) -> Result<BTreeSet<PathBuf>, HostError> {
        let glob = compile_glob(pattern)?;
        Ok(lock(&self.files)
            .keys()
            .filter(|path| glob.is_match(path))
            .cloned()
            .collect())
    }

    async fn read_file(&self, path: &Path) -> Result<String, HostError> {
        lock(&self.reads).push(path.to_path_buf());
        if self.failing_reads.contains(path) {
            return Err(HostError::io(path, denied()));
        }
        lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), HostError> {
        if self.failing_writes.contains(path) {
            return Err(HostError::io(path, denied()));
        }
        lock(&self.files).insert(path.to_path_buf(), content.to_string());
        lock(&self.written).insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn report_error(&self, message: &str) {
        lock(&self.errors).push(message.to_string());
    }

    fn report_info(&self, message: &str) {
        lock(&self.infos).push(message.to_string());
    }
}

fn denied() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::new("")
            .with_file("a.txt", "a")
            .with_file("b.md", "b")
            .with_file("docs/c.txt", "c")
    }

    #[tokio::test]
    async fn default_pattern_matches_everything() {
        let paths = host().find_file_paths("**/*").await.unwrap();
        assert_eq!(paths.len(), 3);
    }

    #[tokio::test]
    async fn star_does_not_cross_directories() {
        let paths = host().find_file_paths("*.txt").await.unwrap();
        assert_eq!(paths, BTreeSet::from([PathBuf::from("a.txt")]));
        let paths = host().find_file_paths("**/*.txt").await.unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[tokio::test]
    async fn invalid_glob_is_an_error() {
        let err = host().find_file_paths("docs/[ab").await.unwrap_err();
        assert!(matches!(err, HostError::InvalidGlob { .. }));
    }

    #[tokio::test]
    async fn braces_select_either_extension() {
        let paths = host().find_file_paths("**/*.{txt,md}").await.unwrap();
        assert_eq!(paths.len(), 3);
        let paths = host().find_file_paths("*.{md,rs}").await.unwrap();
        assert_eq!(paths, BTreeSet::from([PathBuf::from("b.md")]));
    }

    #[tokio::test]
    async fn configured_failures_are_io_errors() {
        let host = host().fail_reads_from("a.txt").fail_writes_to("b.md");
        assert!(matches!(
            host.read_file(Path::new("a.txt")).await,
            Err(HostError::Io { .. })
        ));
        assert!(matches!(
            host.write_file(Path::new("b.md"), "z").await,
            Err(HostError::Io { .. })
        ));
        assert_eq!(host.file("b.md").as_deref(), Some("b"));
        assert!(host.written_files().is_empty());
    }

    #[tokio::test]
    async fn reads_and_writes_are_recorded() {
        let host = host();
        assert_eq!(host.read_file(Path::new("a.txt")).await.unwrap(), "a");
        host.write_file(Path::new("a.txt"), "z").await.unwrap();
        assert_eq!(host.file("a.txt").as_deref(), Some("z"));
        assert_eq!(host.written("a.txt").as_deref(), Some("z"));
        assert_eq!(host.read_count("a.txt"), 1);
        assert!(host.written("b.md").is_none());
    }

    #[tokio::test]
    async fn missing_file_and_script() {
        let host = MemoryHost::without_script();
        assert!(matches!(
            host.read_file(Path::new("nope")).await,
            Err(HostError::NotFound(_))
        ));
        assert!(matches!(
            host.script_text().await,
            Err(HostError::ScriptUnavailable(_))
        ));
    }
}
