use std::io::{Read, Write};
use std::path::Path;

use super::{CommandError, InvalidPayload, Options, OutputMode};
use crate::contract::{copy_text, merge_records};
use crate::models::record::ExtractedDocumentRecord;

/// Name used for a payload read from standard input.
pub const STDIN_NAME: &str = "<stdin>";

/// Raw payload text and where it came from.
#[derive(Debug, Clone)]
pub struct PayloadSource {
    pub name: String,
    pub text: String,
}

/// Run one invocation against the given streams.
pub fn execute(
    options: &Options,
    stdin: &mut impl Read,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    if options.example {
        writeln!(out, "{}", ExtractedDocumentRecord::example().to_json_string_pretty()?)?;
        return Ok(());
    }

    let sources = load_sources(&options.inputs, stdin)?;
    let records = validate_sources(&sources)?;
    tracing::info!(payloads = records.len(), "Extraction payloads validated");

    match options.mode() {
        OutputMode::Merged => {
            let merged = merge_records(&records);
            write_record(out, &merged, options.summary)?;
        }
        OutputMode::Records if options.summary => {
            for (i, (source, record)) in sources.iter().zip(&records).enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                if sources.len() > 1 {
                    writeln!(out, "# {}", source.name)?;
                }
                writeln!(out, "{}", copy_text(record))?;
            }
        }
        OutputMode::Records => match records.as_slice() {
            [single] => write_record(out, single, false)?,
            many => writeln!(out, "{}", serde_json::to_string_pretty(many)?)?,
        },
    }
    Ok(())
}

/// Read every input path; stdin when the list is empty or for `-`.
pub fn load_sources(
    inputs: &[impl AsRef<Path>],
    stdin: &mut impl Read,
) -> Result<Vec<PayloadSource>, CommandError> {
    if inputs.is_empty() {
        return Ok(vec![read_stdin(stdin)?]);
    }
    inputs
        .iter()
        .map(|path| {
            let path = path.as_ref();
            if path == Path::new("-") {
                return read_stdin(&mut *stdin);
            }
            let name = path.display().to_string();
            let text = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
                path: name.clone(),
                source,
            })?;
            Ok(PayloadSource { name, text })
        })
        .collect()
}

/// Validate every source, collecting all failures before giving up.
pub fn validate_sources(
    sources: &[PayloadSource],
) -> Result<Vec<ExtractedDocumentRecord>, CommandError> {
    let mut records = Vec::with_capacity(sources.len());
    let mut failures = Vec::new();

    for source in sources {
        match ExtractedDocumentRecord::from_json_str(&source.text) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(file = %source.name, "Rejected extraction payload");
                failures.push(InvalidPayload {
                    file: source.name.clone(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(records)
    } else {
        Err(CommandError::InvalidPayloads(failures))
    }
}

fn read_stdin(stdin: &mut impl Read) -> Result<PayloadSource, CommandError> {
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .map_err(|source| CommandError::Read {
            path: STDIN_NAME.to_string(),
            source,
        })?;
    Ok(PayloadSource {
        name: STDIN_NAME.to_string(),
        text,
    })
}

fn write_record(
    out: &mut impl Write,
    record: &ExtractedDocumentRecord,
    summary: bool,
) -> Result<(), CommandError> {
    if summary {
        writeln!(out, "{}", copy_text(record))?;
    } else {
        writeln!(out, "{}", record.to_json_string_pretty()?)?;
    }
    Ok(())
}
