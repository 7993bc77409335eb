//! # batchrep-core
//!
//! Script language and rewrite engine for batch text replacement.
//!
//! A script describes ordered substitutions across many files:
//!
//! ```text
//! // Front matter: optional filter and variables
//! filter **/*.ts
//! name = "\w+"
//!
//! // Command blocks
//! in src/**/*.ts
//! replace-regex "(%{name})\(\): void"
//! with "$1: () => void"
//!
//! replace "brown"
//! with "red"
//! ```
//!
//! The whole batch is computed in memory and only files whose content
//! actually changed are written.
//!
//! ## Modules
//!
//! - [`grammar`] - Classification of script lines into instructions
//! - [`substitute`] - Literal and regex find/replace
//! - [`variables`] - Ordered variable table and `%{name}` expansion
//! - [`parser`] - Line state machine producing a [`script::Script`]
//! - [`replacer`] - Batch rewrite engine
//! - [`host`] - Capabilities the engine needs from its environment
//! - [`fs_host`] - Filesystem host rooted at a directory
//! - [`memory_host`] - In-memory host for tests and previews
//! - [`config`] - Persistent user configuration
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```no_run
//! use batchrep_core::memory_host::MemoryHost;
//! use batchrep_core::replacer::BatchReplacer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = MemoryHost::new("replace \"brown\"\nwith \"red\"")
//!         .with_file("fox.txt", "The quick brown fox");
//!
//!     let summary = BatchReplacer::batch_replace(&host).await.expect("batch failed");
//!     assert_eq!(summary.to_string(), "Batch replace completed: 1 file(s) modified.");
//! }
//! ```

pub mod config;
pub mod error;
pub mod fs_host;
pub mod grammar;
pub mod host;
pub mod memory_host;
pub mod parser;
pub mod replacer;
pub mod script;
pub mod substitute;
pub mod variables;
