//! Language vocabulary for the translation loop.
//!
//! The supported set is fixed; the translation coordinator rejects anything
//! outside it with a re-prompt instead of accepting free-form input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language of the supported enumerated set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Language {
    English,
    Arabic,
    Hindi,
    Tagalog,
    Urdu,
    German,
    French,
    Spanish,
    Portuguese,
    Tamil,
    Malayalam,
}

impl Language {
    /// All supported languages, in declaration order.
    pub const ALL: [Language; 11] = [
        Language::English,
        Language::Arabic,
        Language::Hindi,
        Language::Tagalog,
        Language::Urdu,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Portuguese,
        Language::Tamil,
        Language::Malayalam,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Arabic => "arabic",
            Self::Hindi => "hindi",
            Self::Tagalog => "tagalog",
            Self::Urdu => "urdu",
            Self::German => "german",
            Self::French => "french",
            Self::Spanish => "spanish",
            Self::Portuguese => "portuguese",
            Self::Tamil => "tamil",
            Self::Malayalam => "malayalam",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for unsupported language names.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == normalized)
            .ok_or_else(|| UnsupportedLanguage(s.to_owned()))
    }
}

/// Doctor/patient language pair, set once per translation session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagesContext {
    /// The language the doctor speaks.
    pub doctor: Language,
    /// The language the patient speaks.
    pub patient: Language,
}

impl LanguagesContext {
    /// Create a context.
    #[must_use]
    pub fn new(doctor: Language, patient: Language) -> Self {
        Self { doctor, patient }
    }
}
