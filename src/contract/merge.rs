//! Unified view over several extracted documents of the same client.
//!
//! A proposal usually arrives as a handful of PDFs (ID card, CNPJ card,
//! current plan invoice). Reviewers want one record: lists are unioned,
//! counters are summed, and for single-valued fields the latest document
//! that actually carries a value wins.

use std::collections::HashSet;

use crate::config::MERGED_FALLBACK_CONFIDENCE_LEVEL;
use crate::models::record::ExtractedDocumentRecord;

/// Fold records, in order, into one unified record.
///
/// The text preview belongs to a single document and is not carried over.
pub fn merge_records(records: &[ExtractedDocumentRecord]) -> ExtractedDocumentRecord {
    let mut merged = ExtractedDocumentRecord::new(Vec::new());
    let mut confidence: Option<String> = None;

    for record in records {
        merged.ages = unique_numbers(merged.ages.iter().chain(&record.ages).copied());
        merged.beneficiary_names =
            unique_strings(merged.beneficiary_names.iter().chain(&record.beneficiary_names));
        merged.detected_partners =
            unique_strings(merged.detected_partners.iter().chain(&record.detected_partners));
        merged.total_characters = merged
            .total_characters
            .saturating_add(record.total_characters);

        if let Some(value) = record.current_value.filter(|v| v.is_finite()) {
            merged.current_value = Some(value);
        }

        if let Some(count) = record.partner_count.filter(|c| *c > 0) {
            merged.partner_count = Some(merged.partner_count.unwrap_or(0).max(count));
        }

        assign_latest(&mut merged.insurer, &record.insurer);
        assign_latest(&mut merged.plan_type, &record.plan_type);
        assign_latest(&mut merged.full_name, &record.full_name);
        assign_latest(&mut merged.national_id_cpf, &record.national_id_cpf);
        assign_latest(&mut merged.id_document_number_rg, &record.id_document_number_rg);
        assign_latest(&mut merged.ifp, &record.ifp);
        assign_latest(&mut merged.id_document_type, &record.id_document_type);
        assign_latest(&mut merged.birth_date, &record.birth_date);
        assign_latest(&mut merged.issue_date, &record.issue_date);
        assign_latest(&mut merged.issuing_authority, &record.issuing_authority);
        assign_latest(&mut merged.drivers_license_number, &record.drivers_license_number);
        assign_latest(&mut merged.national_id_cnpj, &record.national_id_cnpj);
        assign_latest(&mut merged.company_legal_name, &record.company_legal_name);
        assign_latest(
            &mut merged.state_registration_number,
            &record.state_registration_number,
        );
        assign_latest(&mut merged.incorporation_date, &record.incorporation_date);
        assign_latest(&mut merged.cnpj_status, &record.cnpj_status);
        assign_latest(&mut merged.activity_start_date, &record.activity_start_date);
        assign_latest(&mut merged.trade_name, &record.trade_name);
        assign_latest(&mut merged.notes, &record.notes);

        if let Some(level) = trimmed(&record.confidence_level) {
            confidence = Some(level.to_string());
        }
    }

    merged.confidence_level =
        confidence.unwrap_or_else(|| MERGED_FALLBACK_CONFIDENCE_LEVEL.to_string());

    tracing::debug!(
        documents = records.len(),
        ages = merged.ages.len(),
        total_characters = merged.total_characters,
        "Merged extraction records"
    );

    merged
}

/// Order-preserving dedup.
pub(crate) fn unique_numbers(values: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}

/// Trim, drop blanks, order-preserving dedup.
pub(crate) fn unique_strings<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(|v| trimmed(v))
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

fn assign_latest(target: &mut Option<String>, candidate: &Option<String>) {
    if let Some(value) = candidate.as_deref().and_then(trimmed) {
        *target = Some(value.to_string());
    }
}

fn trimmed(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
