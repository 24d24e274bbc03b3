use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// A label that does not belong to one of the known vocabularies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} label: {value}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownLabel {
                        kind: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ConfidenceLevel {
    Alta => "alta",
    Media => "media",
    Baixa => "baixa",
});

str_enum!(IdentityDocumentType {
    Rg => "rg",
    Cnh => "cnh",
    Ifp => "ifp",
    Outro => "outro",
});

impl ConfidenceLevel {
    /// Interpret a producer label, tolerating case, padding and the accented
    /// spelling "média".
    pub fn from_label(raw: &str) -> Option<Self> {
        fold_label(raw.trim()).parse().ok()
    }
}

/// Lowercase with combining accents removed (NFD), so "Média" reads as "media".
pub fn fold_label(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

impl IdentityDocumentType {
    /// Classify a free-form document type string.
    ///
    /// "cnh"/"habilitação" keywords take precedence over "rg". Only the empty
    /// string is unclassified; any other text without a keyword is `Outro`.
    pub fn from_description(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let normalized = fold_label(raw);
        if normalized.contains("cnh") || normalized.contains("habilit") {
            Some(Self::Cnh)
        } else if normalized.contains("ifp") {
            Some(Self::Ifp)
        } else if normalized.contains("rg") || normalized.contains("identidade") {
            Some(Self::Rg)
        } else {
            Some(Self::Outro)
        }
    }

    /// Display label shown to people reviewing an extraction.
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Rg => "RG",
            Self::Cnh => "CNH",
            Self::Ifp => "IFP",
            Self::Outro => "Outro",
        }
    }
}
