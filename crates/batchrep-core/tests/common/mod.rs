//! Shared test helpers for batchrep-core integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use batchrep_core::error::ReplaceError;
use batchrep_core::memory_host::MemoryHost;
use batchrep_core::replacer::{BatchReplacer, Summary};

/// Build a memory host from a script and `(path, content)` pairs.
pub fn memory_host(script: &str, files: &[(&str, &str)]) -> MemoryHost {
    files
        .iter()
        .fold(MemoryHost::new(script), |host, (path, content)| {
            host.with_file(*path, *content)
        })
}

/// Run a script and return the host for inspection.
pub async fn run(script: &str, files: &[(&str, &str)]) -> (MemoryHost, Result<Summary, ReplaceError>) {
    let host = memory_host(script, files);
    let result = BatchReplacer::batch_replace(&host).await;
    (host, result)
}

/// Expected written files as a map.
pub fn expected(files: &[(&str, &str)]) -> BTreeMap<PathBuf, String> {
    files
        .iter()
        .map(|(path, content)| (PathBuf::from(path), content.to_string()))
        .collect()
}

/// Assert that the run succeeded, reported no error, and wrote exactly `files`.
pub fn assert_modified(host: &MemoryHost, result: &Result<Summary, ReplaceError>, files: &[(&str, &str)]) {
    assert!(result.is_ok(), "expected success, got {:?}", result);
    assert!(host.errors().is_empty(), "no error messages expected: {:?}", host.errors());
    assert_eq!(host.written_files(), expected(files));
    assert_eq!(
        host.infos(),
        vec![format!("Batch replace completed: {} file(s) modified.", files.len())]
    );
}

/// Assert that the run failed with exactly one error message and no writes.
pub fn assert_failed(host: &MemoryHost, message: &str) {
    assert_eq!(host.errors(), vec![message.to_string()]);
    assert!(host.infos().is_empty());
    assert!(host.written_files().is_empty());
}

/// Write a tree of files under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }
}
