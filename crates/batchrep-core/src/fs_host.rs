//! Filesystem-backed [`Host`].
//!
//! Discovery walks the root directory with `walkdir` and matches each file's
//! root-relative path against a `globset` pattern, returning canonical paths
//! of regular files. Paths matching one of the exclude patterns are skipped.
//! In dry-run mode writes are logged and dropped.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{GlobMatcher, GlobSet};
use tracing::{debug, error, info, instrument};
use walkdir::WalkDir;

use crate::config::BatchrepConfig;
use crate::error::HostError;
use crate::host::{compile_glob, compile_glob_set, Host};

/// Where the script source comes from.
#[derive(Debug, Clone)]
pub enum ScriptSource {
    /// Read from a file when requested.
    File(PathBuf),
    /// Already in memory (e.g. read from stdin).
    Text(String),
}

/// A host operating on files under a root directory.
#[derive(Debug, Clone)]
pub struct FsHost {
    root: PathBuf,
    script: ScriptSource,
    exclude: GlobSet,
    dry_run: bool,
}

impl FsHost {
    /// Creates a host rooted at `root`, which must exist.
    pub fn new(root: impl AsRef<Path>, script: ScriptSource) -> Result<Self, HostError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| HostError::io(root, e))?;
        Ok(Self {
            root,
            script,
            exclude: GlobSet::empty(),
            dry_run: false,
        })
    }

    /// Creates a host with excludes and dry-run taken from `config`.
    pub fn from_config(
        root: impl AsRef<Path>,
        script: ScriptSource,
        config: &BatchrepConfig,
    ) -> Result<Self, HostError> {
        Ok(Self::new(root, script)?
            .with_excludes(config.exclude.as_slice())?
            .dry_run(config.dry_run))
    }

    /// Sets the exclude globs, matched against root-relative paths.
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, HostError> {
        self.exclude = compile_glob_set(patterns)?;
        Ok(self)
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Walks `root` and keeps the regular files `glob` selects and `exclude`
/// does not. Absolute patterns are matched against the full path.
fn walk_files(root: &Path, glob: &GlobMatcher, exclude: &GlobSet) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude.is_match(relative) {
            continue;
        }
        if glob.is_match(relative) || glob.is_match(path) {
            files.push(entry.into_path());
        }
    }
    files
}

#[async_trait]
impl Host for FsHost {
    fn has_writable_target(&self) -> bool {
        std::fs::metadata(&self.root)
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }

    async fn script_text(&self) -> Result<String, HostError> {
        match &self.script {
            ScriptSource::Text(text) => Ok(text.clone()),
            ScriptSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                HostError::ScriptUnavailable(format!(
                    "Could not read script {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn find_file_paths(&self, pattern: &str) -> Result<BTreeSet<PathBuf>, HostError> {
        let glob = compile_glob(pattern)?;
        let root = self.root.clone();
        let exclude = self.exclude.clone();
        let files = tokio::task::spawn_blocking(move || walk_files(&root, &glob, &exclude))
            .await
            .map_err(|e| HostError::io(&self.root, std::io::Error::other(e)))?;

        let paths: BTreeSet<PathBuf> = files.into_iter().collect();
        debug!(count = paths.len(), "files discovered");
        Ok(paths)
    }

    async fn read_file(&self, path: &Path) -> Result<String, HostError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HostError::io(path, e))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), HostError> {
        if self.dry_run {
            info!(path = %path.display(), bytes = content.len(), "dry run, skipping write");
            return Ok(());
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| HostError::io(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "file written");
        Ok(())
    }

    fn report_error(&self, message: &str) {
        error!(%message, "batch replace failed");
        eprintln!("Error: {}", message);
    }

    fn report_info(&self, message: &str) {
        info!(%message, dry_run = self.dry_run, "batch replace reported");
        if self.dry_run {
            println!("{} (dry run)", message);
        } else {
            println!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("README.md"), "readme").unwrap();
        std::fs::write(dir.path().join("src/a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("src/nested/b.txt"), "b").unwrap();
        std::fs::write(dir.path().join(".git/config"), "git").unwrap();
        dir
    }

    fn host(dir: &tempfile::TempDir) -> FsHost {
        FsHost::new(dir.path(), ScriptSource::Text(String::new())).unwrap()
    }

    fn relative(host: &FsHost, paths: &BTreeSet<PathBuf>) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(host.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[tokio::test]
    async fn finds_files_only() {
        let dir = tree();
        let host = host(&dir);
        let paths = host.find_file_paths("**/*").await.unwrap();
        let found = relative(&host, &paths);
        assert!(found.contains(&"README.md".to_string()));
        assert!(found.contains(&"src/a.txt".to_string()));
        assert!(found.contains(&"src/nested/b.txt".to_string()));
        assert!(!found.iter().any(|p| p == "src" || p == "src/nested"));
    }

    #[tokio::test]
    async fn single_star_stays_in_one_directory() {
        let dir = tree();
        let host = host(&dir);
        let paths = host.find_file_paths("src/*.txt").await.unwrap();
        assert_eq!(relative(&host, &paths), vec!["src/a.txt"]);
    }

    #[tokio::test]
    async fn excludes_are_applied() {
        let dir = tree();
        let host = host(&dir).with_excludes(&[".git/**"]).unwrap();
        let paths = host.find_file_paths("**/*").await.unwrap();
        assert!(!relative(&host, &paths).iter().any(|p| p.starts_with(".git")));
    }

    #[tokio::test]
    async fn dry_run_leaves_files_untouched() {
        let dir = tree();
        let host = host(&dir).dry_run(true);
        let path = dir.path().join("src/a.txt");
        host.write_file(&path, "changed").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");
    }

    #[tokio::test]
    async fn write_then_read() {
        let dir = tree();
        let host = host(&dir);
        let path = dir.path().join("src/a.txt");
        host.write_file(&path, "changed").await.unwrap();
        assert_eq!(host.read_file(&path).await.unwrap(), "changed");
    }

    #[tokio::test]
    async fn missing_script_file_is_unavailable() {
        let dir = tree();
        let host = FsHost::new(dir.path(), ScriptSource::File(dir.path().join("nope.brs"))).unwrap();
        let err = host.script_text().await.unwrap_err();
        assert!(matches!(err, HostError::ScriptUnavailable(_)));
    }

    #[tokio::test]
    async fn brace_alternation_selects_each_extension() {
        let dir = tree();
        std::fs::write(dir.path().join("src/app.ts"), "x").unwrap();
        std::fs::write(dir.path().join("src/nested/lib.js"), "x").unwrap();
        let host = host(&dir);
        let paths = host.find_file_paths("**/*.{ts,js}").await.unwrap();
        assert_eq!(relative(&host, &paths), vec!["src/app.ts", "src/nested/lib.js"]);
    }

    #[tokio::test]
    async fn unclosed_class_is_an_invalid_glob() {
        let dir = tree();
        let err = host(&dir).find_file_paths("src/[ab").await.unwrap_err();
        assert!(matches!(err, HostError::InvalidGlob { .. }));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn messages_are_mirrored_to_tracing() {
        let dir = tree();
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let host = host(&dir);
            host.report_error("Invalid pattern '(oops'");
            host.report_info("Batch replace completed: 0 file(s) modified.");
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("Invalid pattern '(oops'"));
        assert!(logs.contains("Batch replace completed: 0 file(s) modified."));
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = FsHost::new("/definitely/not/here", ScriptSource::Text(String::new())).unwrap_err();
        assert!(matches!(err, HostError::Io { .. }));
    }

    #[test]
    fn existing_directory_is_writable_target() {
        let dir = tree();
        assert!(host(&dir).has_writable_target());
    }
}
