use serde_json::{Map, Value};

use super::{FieldError, FieldErrorKind, ValidationError, ROOT_FIELD};
use crate::config::DEFAULT_CONFIDENCE_LEVEL;
use crate::models::record::{
    is_known_key, legacy_alias, ExtractedDocumentRecord, FieldPresence, FieldState,
};

/// Decode a raw payload, keeping track of which optional keys were omitted
/// and which were sent as explicit `null`.
///
/// Every field is checked before failing, so the error lists all offending
/// keys. No partial record escapes on failure.
pub fn decode_with_presence(
    value: &Value,
) -> Result<(ExtractedDocumentRecord, FieldPresence), ValidationError> {
    let map = value.as_object().ok_or_else(|| {
        ValidationError::single(FieldError::new(
            ROOT_FIELD,
            FieldErrorKind::NotAnObject,
            format!("Input should be an object, got {}", json_type(value)),
        ))
    })?;

    let mut reader = FieldReader::new(map);

    let record = ExtractedDocumentRecord {
        ages: reader.required_int_list("ages"),
        insurer: reader.optional_string("insurer"),
        current_value: reader.optional_number("current_value"),
        plan_type: reader.optional_string("plan_type"),
        beneficiary_names: reader.string_list_or_empty("beneficiary_names"),
        full_name: reader.optional_string("full_name"),
        national_id_cpf: reader.optional_string("national_id_cpf"),
        id_document_number_rg: reader.optional_string("id_document_number_rg"),
        ifp: reader.optional_string("ifp"),
        id_document_type: reader.optional_string("id_document_type"),
        birth_date: reader.optional_string("birth_date"),
        issue_date: reader.optional_string("issue_date"),
        issuing_authority: reader.optional_string("issuing_authority"),
        drivers_license_number: reader.optional_string("drivers_license_number"),
        national_id_cnpj: reader.optional_string("national_id_cnpj"),
        company_legal_name: reader.optional_string("company_legal_name"),
        state_registration_number: reader.optional_string("state_registration_number"),
        incorporation_date: reader.optional_string("incorporation_date"),
        cnpj_status: reader.optional_string("cnpj_status"),
        activity_start_date: reader.optional_string("activity_start_date"),
        trade_name: reader.optional_string("trade_name"),
        detected_partners: reader.string_list_or_empty("detected_partners"),
        partner_count: reader.optional_int("partner_count"),
        notes: reader.optional_string("notes"),
        confidence_level: reader.string_or("confidence_level", DEFAULT_CONFIDENCE_LEVEL),
        extracted_text_preview: reader.optional_string("extracted_text_preview"),
        total_characters: reader.count_or_zero("total_characters"),
    };

    for key in map.keys().filter(|k| !is_known_key(k)) {
        tracing::debug!(key = %key, "Ignoring unknown extraction key");
    }

    reader.finish(record)
}

impl ExtractedDocumentRecord {
    /// Validate a raw JSON value into a record.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        decode_with_presence(value).map(|(record, _)| record)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ValidationError::invalid_json(&e))?;
        Self::from_value(&value)
    }

    /// Encode with every key present; absent values become `null`.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl TryFrom<Value> for ExtractedDocumentRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Reads typed fields out of a payload, collecting failures instead of
/// stopping at the first one.
struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    errors: Vec<FieldError>,
    presence: FieldPresence,
}

impl<'a> FieldReader<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            errors: Vec::new(),
            presence: FieldPresence::default(),
        }
    }

    /// Canonical key first, legacy alias second.
    fn lookup(&self, field: &str) -> Option<&'a Value> {
        if let Some(value) = self.map.get(field) {
            return Some(value);
        }
        let alias = legacy_alias(field)?;
        let value = self.map.get(alias)?;
        tracing::debug!(field, alias, "Read extraction field from legacy key");
        Some(value)
    }

    fn required_int_list(&mut self, field: &'static str) -> Vec<i64> {
        match self.lookup(field) {
            None => {
                self.errors.push(FieldError::missing(field));
                Vec::new()
            }
            Some(Value::Null) => {
                self.errors.push(FieldError::null_not_allowed(field));
                Vec::new()
            }
            Some(value) => self.int_list(field, value),
        }
    }

    fn int_list(&mut self, field: &str, value: &Value) -> Vec<i64> {
        let Some(items) = value.as_array() else {
            self.errors.push(FieldError::invalid_type(field, "a valid list"));
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match coerce_int(item) {
                Ok(n) => out.push(n),
                Err(kind) => self.errors.push(int_error(format!("{field}[{index}]"), kind)),
            }
        }
        out
    }

    fn string_list_or_empty(&mut self, field: &'static str) -> Vec<String> {
        let value = match self.lookup(field) {
            None => return Vec::new(),
            Some(Value::Null) => {
                self.errors.push(FieldError::null_not_allowed(field));
                return Vec::new();
            }
            Some(value) => value,
        };
        let Some(items) = value.as_array() else {
            self.errors.push(FieldError::invalid_type(field, "a valid list"));
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => self.errors.push(FieldError::invalid_type(
                    format!("{field}[{index}]"),
                    "a valid string",
                )),
            }
        }
        out
    }

    /// Look up an optional scalar and record how it appeared.
    fn optional(&mut self, field: &'static str) -> Option<&'a Value> {
        let found = self.lookup(field);
        let state = match found {
            None => FieldState::Missing,
            Some(Value::Null) => FieldState::ExplicitNull,
            Some(_) => FieldState::Value,
        };
        self.presence.record(field, state);
        found.filter(|v| !v.is_null())
    }

    fn optional_string(&mut self, field: &'static str) -> Option<String> {
        let value = self.optional(field)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.errors.push(FieldError::invalid_type(field, "a valid string"));
                None
            }
        }
    }

    fn optional_int(&mut self, field: &'static str) -> Option<i64> {
        let value = self.optional(field)?;
        match coerce_int(value) {
            Ok(n) => Some(n),
            Err(kind) => {
                self.errors.push(int_error(field.to_string(), kind));
                None
            }
        }
    }

    fn optional_number(&mut self, field: &'static str) -> Option<f64> {
        let value = self.optional(field)?;
        match coerce_number(value) {
            Some(n) => Some(n),
            None => {
                self.errors.push(FieldError::invalid_type(field, "a valid number"));
                None
            }
        }
    }

    fn string_or(&mut self, field: &'static str, default: &str) -> String {
        match self.lookup(field) {
            None => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) => {
                self.errors.push(FieldError::null_not_allowed(field));
                default.to_string()
            }
            Some(_) => {
                self.errors.push(FieldError::invalid_type(field, "a valid string"));
                default.to_string()
            }
        }
    }

    fn count_or_zero(&mut self, field: &'static str) -> u64 {
        let value = match self.lookup(field) {
            None => return 0,
            Some(Value::Null) => {
                self.errors.push(FieldError::null_not_allowed(field));
                return 0;
            }
            Some(value) => value,
        };
        let unsigned = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if let Some(n) = unsigned {
            return n;
        }
        match coerce_int(value) {
            Ok(n) => u64::try_from(n).unwrap_or_else(|_| {
                self.errors.push(FieldError::new(
                    field,
                    FieldErrorKind::OutOfRange,
                    "Input should be greater than or equal to 0",
                ));
                0
            }),
            Err(kind) => {
                self.errors.push(int_error(field.to_string(), kind));
                0
            }
        }
    }

    fn finish(
        self,
        record: ExtractedDocumentRecord,
    ) -> Result<(ExtractedDocumentRecord, FieldPresence), ValidationError> {
        if self.errors.is_empty() {
            return Ok((record, self.presence));
        }
        tracing::warn!(
            field_count = self.errors.len(),
            fields = ?self.errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(),
            "Extraction payload rejected"
        );
        Err(ValidationError {
            errors: self.errors,
        })
    }
}

/// Integer coercion: JSON integers, floats without a fractional part, and
/// strings holding an integer. Booleans are rejected.
fn coerce_int(value: &Value) -> Result<i64, FieldErrorKind> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(FieldErrorKind::OutOfRange);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                Some(f) if f.fract() == 0.0 => Err(FieldErrorKind::OutOfRange),
                _ => Err(FieldErrorKind::InvalidType),
            }
        }
        Value::String(s) => s.trim().parse().map_err(|_| FieldErrorKind::InvalidType),
        _ => Err(FieldErrorKind::InvalidType),
    }
}

/// Number coercion: any finite JSON number or numeric string.
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn int_error(field: String, kind: FieldErrorKind) -> FieldError {
    match kind {
        FieldErrorKind::OutOfRange => FieldError::new(
            field,
            FieldErrorKind::OutOfRange,
            "Input is outside the 64-bit integer range",
        ),
        _ => FieldError::invalid_type(field, "a valid integer"),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
