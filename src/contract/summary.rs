//! Human-readable rendering of an extraction record for reviewers.
//!
//! Labels are in Portuguese, matching the documents being scanned.
//! Identification numbers are shown exactly as extracted.

use serde::Serialize;

use super::merge::{unique_numbers, unique_strings};
use crate::config::SUMMARY_SEPARATOR;
use crate::models::record::ExtractedDocumentRecord;

/// One labelled line of a record summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryField {
    pub label: &'static str,
    pub value: String,
}

/// Labelled non-blank fields of `record`, in display order.
pub fn summary_fields(record: &ExtractedDocumentRecord) -> Vec<SummaryField> {
    let mut fields = Vec::new();
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value {
            let value = value.trim();
            if !value.is_empty() {
                fields.push(SummaryField {
                    label,
                    value: value.to_string(),
                });
            }
        }
    };

    push("Nome completo", record.full_name.clone());
    push(
        "Beneficiários/Sócios",
        joined(unique_strings(&record.beneficiary_names)),
    );
    push(
        "Idades",
        joined(
            unique_numbers(record.ages.iter().copied())
                .iter()
                .map(i64::to_string)
                .collect(),
        ),
    );
    push("CPF", record.national_id_cpf.clone());
    push("RG", record.id_document_number_rg.clone());
    push("IFP", record.ifp.clone());
    push(
        "Tipo de documento",
        record
            .identity_document_type()
            .map(|kind| kind.display_label().to_string()),
    );
    push("Nº da habilitação", record.drivers_license_number.clone());
    push("Data de nascimento", record.birth_date.clone());
    push("Data de expedição", record.issue_date.clone());
    push("Órgão expedidor", record.issuing_authority.clone());

    push("CNPJ", record.national_id_cnpj.clone());
    push("Razão social", record.company_legal_name.clone());
    push("Nome fantasia", record.trade_name.clone());
    push("Inscrição estadual", record.state_registration_number.clone());
    push("Data de abertura", record.incorporation_date.clone());
    push("Status CNPJ", record.cnpj_status.clone());
    push("Data início atividade", record.activity_start_date.clone());

    push("Operadora", record.insurer.clone());
    push("Tipo de plano", record.plan_type.clone());
    push(
        "Valor atual",
        record
            .current_value
            .filter(|v| v.is_finite())
            .map(format_brl),
    );

    push(
        "Sócios detectados",
        joined(unique_strings(&record.detected_partners)),
    );
    push(
        "Total de sócios",
        record
            .partner_count
            .filter(|count| *count > 0)
            .map(|count| count.to_string()),
    );

    push("Observações", record.notes.clone());
    push("Confiança", Some(record.confidence_level.clone()));

    fields
}

/// `label: value` lines, ready to paste into a proposal form.
pub fn copy_text(record: &ExtractedDocumentRecord) -> String {
    summary_fields(record)
        .iter()
        .map(|field| format!("{}: {}", field.label, field.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Partner names of a company document: detected partners first, then any
/// beneficiary names not already listed.
pub fn company_partners(record: &ExtractedDocumentRecord) -> Vec<String> {
    unique_strings(
        record
            .detected_partners
            .iter()
            .chain(&record.beneficiary_names),
    )
}

/// Declared partner count when positive, otherwise the number of names found.
pub fn company_partner_total(record: &ExtractedDocumentRecord) -> usize {
    match record.partner_count {
        Some(count) if count > 0 => usize::try_from(count).unwrap_or(usize::MAX),
        _ => company_partners(record).len(),
    }
}

/// Brazilian real formatting: `R$ 1.250,50`.
pub fn format_brl(value: f64) -> String {
    let scaled = (value.abs() * 100.0).round();
    if !scaled.is_finite() || scaled >= u64::MAX as f64 {
        return format!("R$ {value}");
    }
    let cents = scaled as u64;
    let reais = (cents / 100).to_string();

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, digit) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

fn joined(values: Vec<String>) -> Option<String> {
    (!values.is_empty()).then(|| values.join(SUMMARY_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(fields: &[SummaryField]) -> Vec<&str> {
        fields.iter().map(|f| f.label).collect()
    }

    #[test]
    fn example_summary() {
        let fields = summary_fields(&ExtractedDocumentRecord::example());
        let find = |label: &str| {
            fields
                .iter()
                .find(|f| f.label == label)
                .map(|f| f.value.as_str())
        };

        assert_eq!(find("Nome completo"), Some("João da Silva"));
        assert_eq!(find("Idades"), Some("30, 5, 35"));
        assert_eq!(find("CPF"), Some("12345678909"));
        assert_eq!(find("Tipo de documento"), Some("RG"));
        assert_eq!(find("Valor atual"), Some("R$ 1.250,50"));
        assert_eq!(find("Total de sócios"), Some("2"));
        assert_eq!(find("Confiança"), Some("alta"));
        assert_eq!(find("IFP"), None);
        assert_eq!(find("Nº da habilitação"), None);
    }

    #[test]
    fn minimal_record_only_shows_confidence() {
        let fields = summary_fields(&ExtractedDocumentRecord::new(vec![]));
        assert_eq!(labels(&fields), vec!["Confiança"]);
    }

    #[test]
    fn blank_values_and_zero_partner_count_are_skipped() {
        let mut record = ExtractedDocumentRecord::new(vec![40, 40]);
        record.notes = Some("   ".into());
        record.partner_count = Some(0);
        record.confidence_level = "".into();
        let fields = summary_fields(&record);
        assert_eq!(labels(&fields), vec!["Idades"]);
        assert_eq!(fields[0].value, "40");
    }

    #[test]
    fn copy_text_lines() {
        let mut record = ExtractedDocumentRecord::new(vec![30]);
        record.insurer = Some("AMIL".into());
        assert_eq!(
            copy_text(&record),
            "Idades: 30\nOperadora: AMIL\nConfiança: alta"
        );
    }

    #[test]
    fn partners_union_detected_then_beneficiaries() {
        let record = ExtractedDocumentRecord::example();
        assert_eq!(
            company_partners(&record),
            vec![
                "João Silva".to_string(),
                "Maria Silva".to_string(),
                "Pedro Silva".to_string()
            ]
        );
        assert_eq!(company_partner_total(&record), 2);
    }

    #[test]
    fn partner_total_falls_back_to_names() {
        let mut record = ExtractedDocumentRecord::new(vec![]);
        record.detected_partners = vec!["Ana".into(), "Bia".into()];
        record.partner_count = Some(0);
        assert_eq!(company_partner_total(&record), 2);
        record.partner_count = None;
        assert_eq!(company_partner_total(&record), 2);
    }

    #[test]
    fn brl_formatting() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(9.9), "R$ 9,90");
        assert_eq!(format_brl(999.999), "R$ 1.000,00");
        assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(-10.0), "-R$ 10,00");
    }

    #[test]
    fn brl_formatting_beyond_cent_range_keeps_raw_number() {
        assert_eq!(format_brl(1e30), "R$ 1000000000000000000000000000000");
        assert_eq!(format_brl(f64::INFINITY), "R$ inf");
        assert_eq!(format_brl(1e15), "R$ 1.000.000.000.000.000,00");
    }
}
