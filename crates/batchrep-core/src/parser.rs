//! Script parser.
//!
//! Lines are consumed one at a time by a small state machine. The in-progress
//! command block is a single [`Block`] value that moves `Idle -> In -> Replace`
//! and falls back to `Idle` when a `with` line completes the command, so a
//! partially built block is always coherent.
//!
//! Variables are resolved in two phases: each definition against the
//! variables defined before it, then every command's search pattern against
//! the final table once all lines are read.

use crate::error::{Keyword, ScriptError};
use crate::grammar::{self, Instruction};
use crate::script::{ReplaceCommand, Script, DEFAULT_FILE_PATTERN};
use crate::variables::VariableTable;

/// The command block being assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Block {
    #[default]
    Idle,
    In {
        in_pattern: String,
    },
    Replace {
        in_pattern: Option<String>,
        replace: String,
        as_regex: bool,
    },
}

/// A parsed script together with the variables its front matter defined.
#[derive(Debug, Clone)]
pub struct ParsedScript {
    pub script: Script,
    pub variables: VariableTable,
}

/// Line-oriented script parser.
#[derive(Debug, Default)]
pub struct ScriptParser {
    filter: Option<String>,
    block: Block,
    variables: VariableTable,
    commands: Vec<ReplaceCommand>,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a whole script source.
    pub fn parse(mut self, source: &str) -> Result<ParsedScript, ScriptError> {
        for (index, raw) in source.lines().enumerate() {
            self.feed_line(index + 1, raw)?;
        }
        Ok(self.finish())
    }

    /// Processes one raw line. `line_number` is 1-based.
    pub fn feed_line(&mut self, line_number: usize, raw: &str) -> Result<(), ScriptError> {
        let line = raw.trim();
        if grammar::is_ignorable(line) {
            return Ok(());
        }

        let unexpected = |keyword| ScriptError::Unexpected {
            keyword,
            line: line_number,
            text: line.to_string(),
        };
        let invalid = |keyword| ScriptError::Invalid {
            keyword,
            line: line_number,
            text: line.to_string(),
        };

        match grammar::classify(line) {
            Instruction::Filter(payload) => {
                if self.filter.is_some() || self.block != Block::Idle || !self.commands.is_empty() {
                    return Err(unexpected(Keyword::Filter));
                }
                let pattern = grammar::glob_payload(payload);
                if pattern.is_empty() {
                    return Err(invalid(Keyword::Filter));
                }
                self.filter = Some(pattern.to_string());
            }
            Instruction::In(payload) => {
                if self.block != Block::Idle {
                    return Err(unexpected(Keyword::In));
                }
                let pattern = grammar::glob_payload(payload);
                if pattern.is_empty() {
                    return Err(invalid(Keyword::In));
                }
                self.block = Block::In {
                    in_pattern: pattern.to_string(),
                };
            }
            Instruction::Replace(payload) => {
                self.begin_replace(payload, false)
                    .ok_or_else(|| unexpected(Keyword::Replace))?;
            }
            Instruction::ReplaceRegex(payload) => {
                self.begin_replace(payload, true)
                    .ok_or_else(|| unexpected(Keyword::ReplaceRegex))?;
            }
            Instruction::With(payload) => {
                let command = self
                    .complete(payload)
                    .ok_or_else(|| unexpected(Keyword::With))?;
                self.commands.push(command);
            }
            Instruction::Variable { name, value } => {
                if self.block != Block::Idle || !self.commands.is_empty() {
                    return Err(ScriptError::UnexpectedVariable {
                        line: line_number,
                        text: line.to_string(),
                    });
                }
                self.variables.define(name, value);
            }
            Instruction::Unrecognized => {
                return Err(ScriptError::Unrecognized {
                    line: line_number,
                    text: line.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Moves `Idle` or `In` to `Replace`. Returns `None` if a search pattern
    /// is already set.
    fn begin_replace(&mut self, payload: &str, as_regex: bool) -> Option<()> {
        let in_pattern = match std::mem::take(&mut self.block) {
            Block::Idle => None,
            Block::In { in_pattern } => Some(in_pattern),
            current @ Block::Replace { .. } => {
                self.block = current;
                return None;
            }
        };
        self.block = Block::Replace {
            in_pattern,
            replace: payload.to_string(),
            as_regex,
        };
        Some(())
    }

    /// Completes the current block with a `with` payload and resets it.
    /// Returns `None` if no search pattern is set.
    fn complete(&mut self, payload: &str) -> Option<ReplaceCommand> {
        match std::mem::take(&mut self.block) {
            Block::Replace {
                in_pattern,
                replace,
                as_regex,
            } => Some(ReplaceCommand {
                in_pattern: in_pattern.unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string()),
                replace,
                with: payload.to_string(),
                as_regex,
            }),
            other => {
                self.block = other;
                None
            }
        }
    }

    /// Resolves command patterns against the final variable table and
    /// assembles the script. A block left open at end of input is dropped.
    pub fn finish(self) -> ParsedScript {
        let variables = self.variables;
        let replace_commands = self
            .commands
            .into_iter()
            .map(|mut command| {
                command.replace = variables.resolve(&command.replace);
                command
            })
            .collect();

        ParsedScript {
            script: Script {
                filter: self
                    .filter
                    .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string()),
                replace_commands,
            },
            variables,
        }
    }
}

/// Parses script source into a [`Script`].
pub fn parse(source: &str) -> Result<Script, ScriptError> {
    ScriptParser::new().parse(source).map(|parsed| parsed.script)
}
