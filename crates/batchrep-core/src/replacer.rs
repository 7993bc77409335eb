//! Batch rewrite engine.
//!
//! A run goes through four phases:
//!
//! 1. **Compile** every command's search pattern, so a bad regex fails before
//!    any file is touched.
//! 2. **Select** files: the script filter once, then each command's `in`
//!    pattern, intersected with the filter set.
//! 3. **Rewrite** in memory: commands apply in script order, each one seeing
//!    the accumulated result of the earlier ones on the same file. Every file
//!    is read at most once.
//! 4. **Commit** the files whose final text differs from the original.
//!
//! Phase 3 is the pure function [`rewrite`], which needs no host at all.
//!
//! # Example
//!
//! ```no_run
//! use batchrep_core::fs_host::{FsHost, ScriptSource};
//! use batchrep_core::replacer::BatchReplacer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let script = "replace \"brown\"\nwith \"red\"".to_string();
//!     let host = FsHost::new(".", ScriptSource::Text(script)).unwrap();
//!
//!     // Reports "Batch replace completed: N file(s) modified." through the host
//!     let _ = BatchReplacer::batch_replace(&host).await;
//! }
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::ReplaceError;
use crate::host::Host;
use crate::parser;
use crate::script::{ReplaceCommand, Script};
use crate::substitute::Substitution;

/// A command with its search pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledCommand {
    command: ReplaceCommand,
    substitution: Substitution,
}

impl CompiledCommand {
    pub fn new(command: ReplaceCommand) -> Result<Self, ReplaceError> {
        let substitution = Substitution::new(&command.replace, &command.with, command.as_regex)
            .map_err(|source| ReplaceError::InvalidPattern {
                pattern: command.replace.clone(),
                source,
            })?;
        Ok(Self {
            command,
            substitution,
        })
    }

    pub fn command(&self) -> &ReplaceCommand {
        &self.command
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.substitution.apply(text)
    }
}

/// Compiles every command of a script, in order.
pub fn compile(script: &Script) -> Result<Vec<CompiledCommand>, ReplaceError> {
    script
        .replace_commands
        .iter()
        .cloned()
        .map(CompiledCommand::new)
        .collect()
}

/// The accumulated text of one file during a run.
#[derive(Debug, Clone)]
struct RewriteInstruction {
    original: String,
    new_text: String,
}

/// Per-path accumulated rewrites, owned by a single run.
#[derive(Debug, Default, Clone)]
pub struct RewriteSet {
    entries: BTreeMap<PathBuf, RewriteInstruction>,
}

impl RewriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the path has been read into the set.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Starts tracking a path from its on-disk content. Has no effect if the
    /// path is already tracked.
    pub fn track(&mut self, path: PathBuf, original: String) {
        self.entries
            .entry(path)
            .or_insert_with(|| RewriteInstruction {
                new_text: original.clone(),
                original,
            });
    }

    /// The latest text for a tracked path.
    pub fn working_text(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(|entry| entry.new_text.as_str())
    }

    /// Applies a command to a tracked path. Returns true if the working text
    /// changed; a command that matches nothing leaves earlier changes intact.
    pub fn apply(&mut self, path: &Path, command: &CompiledCommand) -> bool {
        let Some(entry) = self.entries.get_mut(path) else {
            return false;
        };
        let replaced = match command.apply(&entry.new_text) {
            Cow::Borrowed(_) => return false,
            Cow::Owned(text) => text,
        };
        if replaced == entry.new_text {
            return false;
        }
        entry.new_text = replaced;
        true
    }

    /// Paths whose final text differs from the original, with that text.
    pub fn into_changes(self) -> BTreeMap<PathBuf, String> {
        self.entries
            .into_iter()
            .filter(|(_, entry)| entry.new_text != entry.original)
            .map(|(path, entry)| (path, entry.new_text))
            .collect()
    }
}

/// Applies commands in order to in-memory file contents.
///
/// Each step pairs a command with the paths it applies to. Paths missing from
/// `originals` are skipped.
pub fn rewrite<'a, I>(steps: I, originals: &BTreeMap<PathBuf, String>) -> RewriteSet
where
    I: IntoIterator<Item = (&'a CompiledCommand, &'a BTreeSet<PathBuf>)>,
{
    let mut rewrites = RewriteSet::new();
    for (command, targets) in steps {
        for path in targets {
            if !rewrites.contains(path) {
                match originals.get(path) {
                    Some(original) => rewrites.track(path.clone(), original.clone()),
                    None => continue,
                }
            }
            if rewrites.apply(path, command) {
                debug!(path = %path.display(), "rewrite recorded");
            }
        }
    }
    rewrites
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    modified: Vec<PathBuf>,
}

impl Summary {
    /// Number of files written.
    pub fn count(&self) -> usize {
        self.modified.len()
    }

    /// Written paths, sorted.
    pub fn modified(&self) -> &[PathBuf] {
        &self.modified
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch replace completed: {} file(s) modified.", self.count())
    }
}

/// Entry points for running scripts against a [`Host`].
pub struct BatchReplacer;

impl BatchReplacer {
    /// Fetches, parses and runs the host's script, then reports exactly one
    /// terminal message through the host.
    pub async fn batch_replace<H: Host + ?Sized>(host: &H) -> Result<Summary, ReplaceError> {
        let result = Self::load_and_run(host).await;
        match &result {
            Ok(summary) => host.report_info(&summary.to_string()),
            Err(e) => host.report_error(&e.to_string()),
        }
        result
    }

    async fn load_and_run<H: Host + ?Sized>(host: &H) -> Result<Summary, ReplaceError> {
        if !host.has_writable_target() {
            return Err(ReplaceError::NoWritableTarget);
        }
        let source = host.script_text().await?;
        let script = parser::parse(&source)?;
        Self::run(&script, host).await
    }

    /// Runs an already parsed script. Reports nothing through the host.
    #[instrument(skip_all, fields(filter = %script.filter, commands = script.replace_commands.len()))]
    pub async fn run<H: Host + ?Sized>(script: &Script, host: &H) -> Result<Summary, ReplaceError> {
        let commands = compile(script)?;
        info!("starting batch replace");

        let filtered = host.find_file_paths(&script.filter).await?;
        let mut targets = Vec::with_capacity(commands.len());
        for command in &commands {
            let in_paths = host.find_file_paths(&command.command().in_pattern).await?;
            let selected: BTreeSet<PathBuf> = in_paths.intersection(&filtered).cloned().collect();
            debug!(in_pattern = %command.command().in_pattern, files = selected.len(), "command selection");
            targets.push(selected);
        }

        let mut originals = BTreeMap::new();
        for path in targets.iter().flatten() {
            if !originals.contains_key(path) {
                let text = host.read_file(path).await?;
                originals.insert(path.clone(), text);
            }
        }

        let changes = rewrite(commands.iter().zip(targets.iter()), &originals).into_changes();

        let mut modified = Vec::with_capacity(changes.len());
        for (path, text) in changes {
            host.write_file(&path, &text).await?;
            modified.push(path);
        }

        let summary = Summary { modified };
        info!(modified = summary.count(), "batch replace finished");
        Ok(summary)
    }
}
