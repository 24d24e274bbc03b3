pub mod commands;
pub mod config;
pub mod contract;
pub mod models;

pub use contract::{decode_with_presence, FieldError, FieldErrorKind, ValidationError};
pub use models::{ExtractedDocumentRecord, FieldPresence, FieldState};

use std::process::ExitCode;

use commands::CommandError;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point of the `scanner-pdf` binary.
pub fn run() -> ExitCode {
    init_tracing();
    tracing::debug!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let result = commands::parse_args(std::env::args().skip(1)).and_then(|options| {
        commands::execute(
            &options,
            &mut std::io::stdin().lock(),
            &mut std::io::stdout().lock(),
        )
    });

    match &result {
        Ok(()) => {}
        Err(CommandError::Usage(err)) => {
            let _ = err.print();
        }
        Err(err) => {
            tracing::error!(error = %err, "scanner-pdf failed");
            eprintln!("{}", err.report());
        }
    }
    ExitCode::from(exit_status(&result))
}

/// Exit status for the outcome of one invocation.
pub fn exit_status(result: &Result<(), CommandError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<(), CommandError> {
        commands::parse_args(list.iter().map(|s| s.to_string())).map(|_| ())
    }

    #[test]
    fn success_exits_zero() {
        assert_eq!(exit_status(&Ok(())), 0);
        assert_eq!(exit_status(&parse(&["--version"])), 0);
    }

    #[test]
    fn usage_errors_exit_two() {
        assert_eq!(exit_status(&parse(&["--bogus"])), 2);
        assert_eq!(exit_status(&parse(&["-", "-"])), 2);
    }

    #[test]
    fn validation_and_read_failures_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"ages": null}"#).unwrap();

        let options = commands::Options {
            inputs: vec![bad],
            ..Default::default()
        };
        let invalid = commands::execute(&options, &mut std::io::empty(), &mut Vec::<u8>::new());
        assert!(matches!(invalid, Err(CommandError::InvalidPayloads(_))));
        assert_eq!(exit_status(&invalid), 1);

        let options = commands::Options {
            inputs: vec![dir.path().join("absent.json")],
            ..Default::default()
        };
        let unreadable = commands::execute(&options, &mut std::io::empty(), &mut Vec::<u8>::new());
        assert!(matches!(unreadable, Err(CommandError::Read { .. })));
        assert_eq!(exit_status(&unreadable), 1);
    }
}
