//! Keyword/character-set language detection.

/// Languages the bot answers in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Arabic,
    French,
    English,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::French => "fr",
            Language::English => "en",
        }
    }

    /// Parse a language tag. Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ar" => Language::Arabic,
            "fr" => Language::French,
            _ => Language::English,
        }
    }
}

const ARABIC_LETTERS: &str = "ابتثجحخدذرزسشصضطظعغفقكلمنهويىءئة";

const FRENCH_KEYWORDS: &[&str] = &[
    "ministère",
    "demande",
    "inscription",
    "offre",
    "emploi",
    "bonjour",
    "merci",
];

/// Classify `text`. Any Arabic letter wins, then any French keyword, else English.
pub fn detect_language(text: &str) -> Language {
    let t = text.to_lowercase();
    if t.chars().any(|ch| ARABIC_LETTERS.contains(ch)) {
        return Language::Arabic;
    }
    if FRENCH_KEYWORDS.iter().any(|k| t.contains(k)) {
        return Language::French;
    }
    Language::English
}
