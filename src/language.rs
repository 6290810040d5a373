//! Spoken-language selection and the participant metadata payload.
//!
//! The language lives in UI state and is mirrored into the local
//! participant's metadata as a small JSON object, `{"language":"en"}`.
//! The agent on the other side of the session reads it to pick its
//! speech models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of spoken languages the agent supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (the default).
    #[default]
    En,
    /// Kannada.
    Kn,
    /// Hindi.
    Hi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Kn, Language::Hi];

    /// Wire code used in the metadata payload and the connection-details
    /// query string.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Kn => "kn",
            Language::Hi => "hi",
        }
    }

    /// Human-readable label shown on the welcome surface.
    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Kn => "ಕನ್ನಡ",
            Language::Hi => "हिंदी",
        }
    }

    /// Parse a wire code back into a language. Unknown codes are rejected
    /// rather than defaulted so callers can distinguish bad input.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "kn" => Some(Language::Kn),
            "hi" => Some(Language::Hi),
            _ => None,
        }
    }

    /// Serialized metadata record for the local participant.
    pub fn metadata(self) -> String {
        serde_json::to_string(&SessionMetadata { language: self })
            .expect("serializing metadata cannot fail")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The record attached to the local participant while connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionMetadata {
    pub language: Language,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_english() {
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Kn.code(), "kn");
        assert_eq!(Language::Hi.code(), "hi");
    }

    #[test]
    fn test_parse_valid_codes() {
        for lang in Language::ALL {
            assert_eq!(Language::parse(lang.code()), Some(lang));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(Language::parse(" EN "), Some(Language::En));
        assert_eq!(Language::parse("Kn"), Some(Language::Kn));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Language::parse("fr"), None);
        assert_eq!(Language::parse(""), None);
        assert_eq!(Language::parse("english"), None);
    }

    #[test]
    fn test_metadata_payload_shape() {
        assert_eq!(Language::Kn.metadata(), r#"{"language":"kn"}"#);
    }
}
