//! Command-line runner for batch replace scripts.
//!
//! # Usage
//!
//! ```bash
//! # Run a script against the current directory
//! batchrep run rename.brs
//!
//! # Run against another directory, reading the script from stdin
//! cat rename.brs | batchrep -C ~/src/project run
//!
//! # Show what would change without writing anything
//! batchrep run rename.brs --dry-run
//!
//! # Parse only and print the resulting plan
//! batchrep check rename.brs
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use batchrep_core::config::BatchrepConfig;
use batchrep_core::error::{HostError, ReplaceError};
use batchrep_core::fs_host::{FsHost, ScriptSource};
use batchrep_core::parser::{ParsedScript, ScriptParser};
use batchrep_core::replacer::{self, BatchReplacer};

#[derive(Parser)]
#[command(name = "batchrep", about = "Apply scripted text replacements across many files")]
#[command(version)]
struct Cli {
    /// Directory the script's file patterns are resolved against
    #[arg(short = 'C', long, default_value = ".", env = "BATCHREP_ROOT")]
    root: PathBuf,

    /// Config file to use instead of ~/.batchrep/config.json
    #[arg(long, env = "BATCHREP_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a batch replace script
    Run {
        /// Path to the script file (reads stdin if omitted)
        script: Option<PathBuf>,
        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,
        /// Additional root-relative globs to skip (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Parse a script and print its plan without touching any file
    Check {
        /// Path to the script file (reads stdin if omitted)
        script: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8, log_file: Option<&Path>) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().map(|n| n.to_owned()).unwrap_or_else(|| "batchrep.log".into());
            let file_appender = tracing_appender::rolling::never(dir, name);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref());

    let config = match &cli.config {
        Some(path) => BatchrepConfig::load_from(path),
        None => BatchrepConfig::load(),
    };
    debug!(?config, "configuration loaded");

    let result = match cli.command {
        Command::Run {
            script,
            dry_run,
            exclude,
        } => run_script(&cli.root, script, dry_run, exclude, config).await,
        Command::Check { script } => check_script(script),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e.exit_code()),
    }
}

/// Reads the script eagerly from stdin, or defers to the host for files.
fn script_source(path: Option<PathBuf>) -> Result<ScriptSource, HostError> {
    match path {
        Some(path) => Ok(ScriptSource::File(path)),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|e| {
                HostError::ScriptUnavailable(format!("Could not read script from stdin: {}", e))
            })?;
            Ok(ScriptSource::Text(buf))
        }
    }
}

async fn run_script(
    root: &Path,
    script: Option<PathBuf>,
    dry_run: bool,
    exclude: Vec<String>,
    mut config: BatchrepConfig,
) -> Result<(), ReplaceError> {
    config.exclude.extend(exclude);
    config.dry_run |= dry_run;

    let host = script_source(script)
        .and_then(|source| FsHost::from_config(root, source, &config))
        .map_err(|e| {
            eprintln!("Error: {}", e);
            ReplaceError::from(e)
        })?;

    // The host prints the summary or the error.
    BatchReplacer::batch_replace(&host).await.map(|_| ())
}

fn check_script(script: Option<PathBuf>) -> Result<(), ReplaceError> {
    let text = match script_source(script) {
        Ok(ScriptSource::Text(text)) => Ok(text),
        Ok(ScriptSource::File(path)) => std::fs::read_to_string(&path).map_err(|e| {
            HostError::ScriptUnavailable(format!("Could not read script {}: {}", path.display(), e))
        }),
        Err(e) => Err(e),
    };

    let parsed = text
        .map_err(ReplaceError::from)
        .and_then(|text| Ok(ScriptParser::new().parse(&text)?))
        .and_then(|parsed| replacer::compile(&parsed.script).map(|_| parsed));

    match parsed {
        Ok(parsed) => {
            print!("{}", render_plan(&parsed));
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}

fn render_plan(parsed: &ParsedScript) -> String {
    let mut out = format!("filter {}\n", parsed.script.filter);
    for variable in parsed.variables.iter() {
        out.push_str(&format!("{} = \"{}\"\n", variable.name, variable.value));
    }
    for (index, command) in parsed.script.replace_commands.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, command));
    }
    out.push_str(&format!(
        "{} command(s)\n",
        parsed.script.replace_commands.len()
    ));
    out
}
