pub mod decode;
pub mod merge;
pub mod summary;

pub use decode::*;
pub use merge::*;
pub use summary::*;

use serde::Serialize;
use thiserror::Error;

/// Field name used for failures that concern the payload as a whole.
pub const ROOT_FIELD: &str = "$";

/// Why a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Missing,
    NullNotAllowed,
    InvalidType,
    OutOfRange,
    NotAnObject,
    InvalidJson,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Canonical key, `key[index]` for sequence elements, or `$`.
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(field, FieldErrorKind::Missing, "Field required")
    }

    pub fn null_not_allowed(field: &str) -> Self {
        Self::new(field, FieldErrorKind::NullNotAllowed, "Field may not be null")
    }

    pub fn invalid_type(field: impl Into<String>, expected: &str) -> Self {
        Self::new(
            field,
            FieldErrorKind::InvalidType,
            format!("Input should be {expected}"),
        )
    }
}

/// Type/presence validation failure of an extraction payload.
///
/// Carries every failing field, never just the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Extraction payload failed validation: {}", describe(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn invalid_json(err: &serde_json::Error) -> Self {
        Self::single(FieldError::new(
            ROOT_FIELD,
            FieldErrorKind::InvalidJson,
            format!("Invalid JSON: {err}"),
        ))
    }

    /// Names of the failing fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Whether any failure concerns `field` or one of its elements.
    pub fn concerns(&self, field: &str) -> bool {
        self.errors.iter().any(|e| {
            e.field == field
                || e.field
                    .strip_prefix(field)
                    .is_some_and(|rest| rest.starts_with('['))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_field() {
        let err = ValidationError {
            errors: vec![
                FieldError::missing("ages"),
                FieldError::invalid_type("insurer", "a valid string"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("ages (Field required)"));
        assert!(text.contains("insurer (Input should be a valid string)"));
    }

    #[test]
    fn concerns_matches_elements_but_not_prefixes() {
        let err = ValidationError::single(FieldError::invalid_type("ages[2]", "a valid integer"));
        assert!(err.concerns("ages"));
        assert!(err.concerns("ages[2]"));
        assert!(!err.concerns("age"));
        assert_eq!(err.fields(), vec!["ages[2]"]);
    }

    #[test]
    fn serializes_as_structured_list() {
        let err = ValidationError::single(FieldError::null_not_allowed("total_characters"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "errors": [{
                    "field": "total_characters",
                    "kind": "null_not_allowed",
                    "message": "Field may not be null"
                }]
            })
        );
    }

    #[test]
    fn invalid_json_targets_root() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ValidationError::invalid_json(&parse_err);
        assert_eq!(err.errors[0].field, ROOT_FIELD);
        assert_eq!(err.errors[0].kind, FieldErrorKind::InvalidJson);
    }
}
