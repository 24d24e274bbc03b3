use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{ConfidenceLevel, IdentityDocumentType};
use crate::config::DEFAULT_CONFIDENCE_LEVEL;

/// Normalized output of one PDF extraction pass.
///
/// Only constructible from raw payloads through the decoder in
/// `contract::decode` (the `Deserialize` impl routes through it too), so a
/// value of this type has always passed type/shape validation. Dates are
/// display strings exactly as the extraction engine produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct ExtractedDocumentRecord {
    /// Ages of the beneficiaries found in the document.
    pub ages: Vec<i64>,
    pub insurer: Option<String>,
    pub current_value: Option<f64>,
    pub plan_type: Option<String>,
    pub beneficiary_names: Vec<String>,

    // Personal identification
    pub full_name: Option<String>,
    pub national_id_cpf: Option<String>,
    pub id_document_number_rg: Option<String>,
    pub ifp: Option<String>,
    pub id_document_type: Option<String>,
    pub birth_date: Option<String>,
    pub issue_date: Option<String>,
    pub issuing_authority: Option<String>,
    pub drivers_license_number: Option<String>,

    // Corporate registration
    pub national_id_cnpj: Option<String>,
    pub company_legal_name: Option<String>,
    pub state_registration_number: Option<String>,
    pub incorporation_date: Option<String>,
    pub cnpj_status: Option<String>,
    pub activity_start_date: Option<String>,
    pub trade_name: Option<String>,
    pub detected_partners: Vec<String>,
    pub partner_count: Option<i64>,

    // Extraction metadata
    pub notes: Option<String>,
    pub confidence_level: String,
    pub extracted_text_preview: Option<String>,
    pub total_characters: u64,
}

/// Canonical wire keys, in encoding order.
pub const FIELD_NAMES: [&str; 27] = [
    "ages",
    "insurer",
    "current_value",
    "plan_type",
    "beneficiary_names",
    "full_name",
    "national_id_cpf",
    "id_document_number_rg",
    "ifp",
    "id_document_type",
    "birth_date",
    "issue_date",
    "issuing_authority",
    "drivers_license_number",
    "national_id_cnpj",
    "company_legal_name",
    "state_registration_number",
    "incorporation_date",
    "cnpj_status",
    "activity_start_date",
    "trade_name",
    "detected_partners",
    "partner_count",
    "notes",
    "confidence_level",
    "extracted_text_preview",
    "total_characters",
];

/// Keys whose absent state is `None` and whose presence is tracked.
pub const OPTIONAL_SCALAR_FIELDS: [&str; 22] = [
    "insurer",
    "current_value",
    "plan_type",
    "full_name",
    "national_id_cpf",
    "id_document_number_rg",
    "ifp",
    "id_document_type",
    "birth_date",
    "issue_date",
    "issuing_authority",
    "drivers_license_number",
    "national_id_cnpj",
    "company_legal_name",
    "state_registration_number",
    "incorporation_date",
    "cnpj_status",
    "activity_start_date",
    "trade_name",
    "partner_count",
    "notes",
    "extracted_text_preview",
];

/// Legacy Portuguese wire keys still emitted by older extraction engines.
/// (canonical, legacy)
pub const LEGACY_KEY_ALIASES: [(&str, &str); 27] = [
    ("ages", "idades"),
    ("insurer", "operadora"),
    ("current_value", "valor_atual"),
    ("plan_type", "tipo_plano"),
    ("beneficiary_names", "nome_beneficiarios"),
    ("full_name", "nome_completo"),
    ("national_id_cpf", "cpf"),
    ("id_document_number_rg", "rg"),
    ("ifp", "ifp"),
    ("id_document_type", "documento_identificacao_tipo"),
    ("birth_date", "data_nascimento"),
    ("issue_date", "data_expedicao"),
    ("issuing_authority", "orgao_expedidor"),
    ("drivers_license_number", "numero_habilitacao"),
    ("national_id_cnpj", "cnpj"),
    ("company_legal_name", "razao_social"),
    ("state_registration_number", "inscricao_estadual"),
    ("incorporation_date", "data_abertura"),
    ("cnpj_status", "status_cnpj"),
    ("activity_start_date", "data_inicio_atividade"),
    ("trade_name", "nome_fantasia"),
    ("detected_partners", "socios_detectados"),
    ("partner_count", "total_socios"),
    ("notes", "observacoes"),
    ("confidence_level", "confianca"),
    ("extracted_text_preview", "texto_extraido_preview"),
    ("total_characters", "total_caracteres"),
];

/// Legacy key for a canonical key, when it differs.
pub fn legacy_alias(canonical: &str) -> Option<&'static str> {
    LEGACY_KEY_ALIASES
        .iter()
        .find(|(c, legacy)| *c == canonical && c != legacy)
        .map(|(_, legacy)| *legacy)
}

/// Whether `key` is a canonical or legacy wire key.
pub fn is_known_key(key: &str) -> bool {
    LEGACY_KEY_ALIASES
        .iter()
        .any(|(canonical, legacy)| *canonical == key || *legacy == key)
}

impl ExtractedDocumentRecord {
    /// A record holding only `ages`, every other field at its default.
    pub fn new(ages: Vec<i64>) -> Self {
        Self {
            ages,
            insurer: None,
            current_value: None,
            plan_type: None,
            beneficiary_names: Vec::new(),
            full_name: None,
            national_id_cpf: None,
            id_document_number_rg: None,
            ifp: None,
            id_document_type: None,
            birth_date: None,
            issue_date: None,
            issuing_authority: None,
            drivers_license_number: None,
            national_id_cnpj: None,
            company_legal_name: None,
            state_registration_number: None,
            incorporation_date: None,
            cnpj_status: None,
            activity_start_date: None,
            trade_name: None,
            detected_partners: Vec::new(),
            partner_count: None,
            notes: None,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL.to_string(),
            extracted_text_preview: None,
            total_characters: 0,
        }
    }

    /// Canonical example instance used in documentation and tests.
    pub fn example() -> Self {
        Self {
            ages: vec![30, 5, 35],
            insurer: Some("AMIL".into()),
            current_value: Some(1250.50),
            plan_type: Some("ADESAO".into()),
            beneficiary_names: vec![
                "João Silva".into(),
                "Maria Silva".into(),
                "Pedro Silva".into(),
            ],
            full_name: Some("João da Silva".into()),
            national_id_cpf: Some("12345678909".into()),
            id_document_number_rg: Some("123456789".into()),
            ifp: None,
            id_document_type: Some("rg".into()),
            birth_date: Some("10/03/1989".into()),
            issue_date: Some("15/04/2019".into()),
            issuing_authority: Some("SSP-RJ".into()),
            drivers_license_number: None,
            national_id_cnpj: Some("50216907000160".into()),
            company_legal_name: Some("Empresa Exemplo LTDA".into()),
            state_registration_number: Some("123456789.00-00".into()),
            incorporation_date: Some("18/07/2014".into()),
            cnpj_status: Some("ATIVA".into()),
            activity_start_date: Some("18/07/2014".into()),
            trade_name: Some("Empresa Exemplo".into()),
            detected_partners: vec!["João Silva".into(), "Maria Silva".into()],
            partner_count: Some(2),
            notes: Some("Plano com cobertura nacional".into()),
            confidence_level: "alta".into(),
            extracted_text_preview: Some("PROPOSTA DE ADESÃO...".into()),
            total_characters: 2500,
        }
    }

    /// Known confidence label, if the producer used one.
    pub fn confidence(&self) -> Option<ConfidenceLevel> {
        ConfidenceLevel::from_label(&self.confidence_level)
    }

    /// Identity document kind: the declared type when present, otherwise
    /// inferred from which document number was extracted.
    pub fn identity_document_type(&self) -> Option<IdentityDocumentType> {
        if let Some(explicit) = self
            .id_document_type
            .as_deref()
            .and_then(IdentityDocumentType::from_description)
        {
            return Some(explicit);
        }
        if has_text(&self.drivers_license_number) {
            Some(IdentityDocumentType::Cnh)
        } else if has_text(&self.ifp) {
            Some(IdentityDocumentType::Ifp)
        } else if has_text(&self.id_document_number_rg) {
            Some(IdentityDocumentType::Rg)
        } else {
            None
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// How an optional scalar key appeared in the decoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// The key was not in the payload.
    Missing,
    /// The key was present with an explicit `null`.
    ExplicitNull,
    /// The key carried a value.
    Value,
}

/// Presence of every optional scalar key in a decoded payload.
///
/// Kept outside the record so that equality and the wire shape stay the
/// same whether a field was omitted or sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldPresence {
    states: BTreeMap<&'static str, FieldState>,
}

impl FieldPresence {
    pub(crate) fn record(&mut self, field: &'static str, state: FieldState) {
        self.states.insert(field, state);
    }

    /// State of `field`; keys never recorded read as `Missing`.
    pub fn state(&self, field: &str) -> FieldState {
        self.states
            .get(field)
            .copied()
            .unwrap_or(FieldState::Missing)
    }

    pub fn is_explicit_null(&self, field: &str) -> bool {
        self.state(field) == FieldState::ExplicitNull
    }

    pub fn was_supplied(&self, field: &str) -> bool {
        self.state(field) != FieldState::Missing
    }

    /// Keys sent as explicit `null`.
    pub fn explicit_nulls(&self) -> Vec<&'static str> {
        self.states
            .iter()
            .filter(|(_, state)| **state == FieldState::ExplicitNull)
            .map(|(field, _)| *field)
            .collect()
    }
}
