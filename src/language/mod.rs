use serde::{Deserialize, Serialize};

/// Languages understood by the recognition and text-generation providers.
///
/// Both the recognizer and the translator resolve names through this table, so a name always
/// maps to the same recognition code. Unknown names resolve to [`Language::English`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Gujarati,
    Marathi,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Punjabi,
    Urdu,
    Spanish,
    French,
    German,
}

impl Language {
    pub const ALL: [Language; 14] = [
        Language::English,
        Language::Hindi,
        Language::Gujarati,
        Language::Marathi,
        Language::Bengali,
        Language::Tamil,
        Language::Telugu,
        Language::Kannada,
        Language::Malayalam,
        Language::Punjabi,
        Language::Urdu,
        Language::Spanish,
        Language::French,
        Language::German,
    ];

    /// Canonical human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Gujarati => "Gujarati",
            Language::Marathi => "Marathi",
            Language::Bengali => "Bengali",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Kannada => "Kannada",
            Language::Malayalam => "Malayalam",
            Language::Punjabi => "Punjabi",
            Language::Urdu => "Urdu",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
        }
    }

    /// Recognition code (ISO 639-1)
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Gujarati => "gu",
            Language::Marathi => "mr",
            Language::Bengali => "bn",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Kannada => "kn",
            Language::Malayalam => "ml",
            Language::Punjabi => "pa",
            Language::Urdu => "ur",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
        }
    }

    /// Look up a language by name or code, case-insensitively
    pub fn lookup(input: &str) -> Option<Self> {
        let needle = input.trim();
        Self::ALL.into_iter().find(|lang| {
            lang.name().eq_ignore_ascii_case(needle) || lang.code().eq_ignore_ascii_case(needle)
        })
    }

    /// Resolve a requested language, falling back to English for anything unknown
    pub fn resolve(input: &str) -> Self {
        Self::lookup(input).unwrap_or_else(|| {
            tracing::debug!(requested = input, "Unknown language, falling back to English");
            Language::English
        })
    }

    /// Reverse lookup from a recognition code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_names() {
        assert_eq!(Language::resolve("English").code(), "en");
        assert_eq!(Language::resolve("Hindi").code(), "hi");
        assert_eq!(Language::resolve("Gujarati").code(), "gu");
        assert_eq!(Language::resolve("  gujarati ").code(), "gu");
    }

    #[test]
    fn test_unknown_language_resolves_to_english() {
        assert_eq!(Language::resolve("Klingon"), Language::English);
        assert_eq!(Language::resolve(""), Language::English);
        assert!(Language::lookup("Klingon").is_none());
    }

    #[test]
    fn test_codes_round_trip_through_table() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
            assert_eq!(Language::resolve(lang.name()), lang);
        }
    }

    #[test]
    fn test_lookup_accepts_codes() {
        assert_eq!(Language::lookup("HI"), Some(Language::Hindi));
        assert_eq!(Language::from_code("xx"), None);
    }
}
