//! Command-line consumer of extraction payloads.
//!
//! Reads payload files (or stdin), validates them, and prints canonical
//! JSON, a merged record, or reviewer copy-text.

pub mod process;

pub use process::*;

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use serde::Serialize;
use thiserror::Error;

use crate::config;
use crate::contract::ValidationError;

/// A payload that failed validation, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidPayload {
    pub file: String,
    #[serde(flatten)]
    pub error: ValidationError,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{} payload(s) failed validation", .0.len())]
    InvalidPayloads(Vec<InvalidPayload>),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl CommandError {
    /// Structured form written to stderr.
    pub fn report(&self) -> serde_json::Value {
        match self {
            CommandError::InvalidPayloads(failures) => serde_json::json!({ "invalid": failures }),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }

    /// Process exit status: 2 for usage errors, 1 for everything else.
    /// `--help` and `--version` surface as clap errors but exit cleanly.
    pub fn exit_status(&self) -> u8 {
        match self {
            CommandError::Usage(err) if !err.use_stderr() => 0,
            CommandError::Usage(_) => 2,
            _ => 1,
        }
    }
}

/// How validated records are combined before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One output per payload.
    #[default]
    Records,
    /// A single merged record.
    Merged,
}

/// Validates extraction payloads (JSON) read from FILEs, or stdin when none.
#[derive(Parser, Debug, Clone, PartialEq, Eq, Default)]
#[command(name = "scanner-pdf")]
#[command(version)]
pub struct Options {
    /// Fold every payload into one unified record
    #[arg(long)]
    pub merge: bool,

    /// Print labelled copy-text instead of JSON
    #[arg(long)]
    pub summary: bool,

    /// Print the canonical example payload and exit
    #[arg(long)]
    pub example: bool,

    /// Payload files; `-` reads stdin
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,
}

impl Options {
    pub fn mode(&self) -> OutputMode {
        if self.merge {
            OutputMode::Merged
        } else {
            OutputMode::Records
        }
    }
}

/// Parse arguments (program name already stripped).
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, CommandError> {
    let options =
        Options::try_parse_from(std::iter::once(config::APP_NAME.to_string()).chain(args))?;

    let stdin_count = options
        .inputs
        .iter()
        .filter(|path| path.as_path() == Path::new("-"))
        .count();
    if stdin_count > 1 {
        let err = Options::command().error(
            ErrorKind::ArgumentConflict,
            "standard input (`-`) can only be read once",
        );
        return Err(err.into());
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn usage_kind(result: Result<Options, CommandError>) -> ErrorKind {
        match result {
            Err(CommandError::Usage(err)) => err.kind(),
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn options_definition_is_consistent() {
        Options::command().debug_assert();
    }

    #[test]
    fn defaults_to_records_from_stdin() {
        let options = parse_args(args(&[])).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.mode(), OutputMode::Records);
        assert!(options.inputs.is_empty());
    }

    #[test]
    fn flags_and_files() {
        let options = parse_args(args(&["--merge", "a.json", "--summary", "b.json"])).unwrap();
        assert_eq!(options.mode(), OutputMode::Merged);
        assert!(options.summary);
        assert_eq!(
            options.inputs,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
    }

    #[test]
    fn dash_is_a_path() {
        let options = parse_args(args(&["-"])).unwrap();
        assert_eq!(options.inputs, vec![PathBuf::from("-")]);
    }

    #[test]
    fn repeated_dash_is_usage_error() {
        let result = parse_args(args(&["-", "a.json", "-"]));
        assert_eq!(usage_kind(result), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let err = parse_args(args(&["--pretty"])).unwrap_err();
        assert!(err.to_string().contains("--pretty"));
        assert!(matches!(&err, CommandError::Usage(e) if e.kind() == ErrorKind::UnknownArgument));
    }

    #[test]
    fn help_lists_flags() {
        let err = parse_args(args(&["--help"])).unwrap_err();
        assert!(matches!(&err, CommandError::Usage(e) if e.kind() == ErrorKind::DisplayHelp));
        let text = err.to_string();
        assert!(text.contains("--merge"));
        assert!(text.contains("--example"));
    }

    #[test]
    fn exit_status_by_error() {
        let usage = parse_args(args(&["--pretty"])).unwrap_err();
        assert_eq!(usage.exit_status(), 2);

        let repeated_dash = parse_args(args(&["-", "-"])).unwrap_err();
        assert_eq!(repeated_dash.exit_status(), 2);

        let help = parse_args(args(&["--help"])).unwrap_err();
        assert_eq!(help.exit_status(), 0);

        let invalid = CommandError::InvalidPayloads(vec![InvalidPayload {
            file: "a.json".into(),
            error: ValidationError::single(crate::contract::FieldError::missing("ages")),
        }]);
        assert_eq!(invalid.exit_status(), 1);

        let read = CommandError::Read {
            path: "missing.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(read.exit_status(), 1);
    }

    #[test]
    fn invalid_payload_report_shape() {
        let err = CommandError::InvalidPayloads(vec![InvalidPayload {
            file: "a.json".into(),
            error: ValidationError::single(crate::contract::FieldError::missing("ages")),
        }]);
        assert_eq!(err.to_string(), "1 payload(s) failed validation");
        assert_eq!(
            err.report(),
            serde_json::json!({
                "invalid": [{
                    "file": "a.json",
                    "errors": [{"field": "ages", "kind": "missing", "message": "Field required"}]
                }]
            })
        );
    }
}
