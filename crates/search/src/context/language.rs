//! Query language detection
//!
//! Heuristic over the raw query: French diacritics and stopwords versus
//! English stopwords. Never fails; ambiguity falls back to English. Used
//! only when the caller did not pin a language.

use lexforge_common::model::Language;

const FRENCH_STOPWORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "est", "que", "qui", "quoi", "quel",
    "quelle", "quels", "quelles", "dans", "pour", "sur", "avec", "loi", "règlement", "article",
    "au", "aux", "ce", "cette", "comment", "pourquoi",
];

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "is", "are", "what", "which", "who", "how", "why", "in", "for",
    "on", "with", "act", "regulation", "section", "to", "this", "that", "does", "can",
];

const FRENCH_DIACRITICS: &[char] = &[
    'à', 'â', 'ç', 'é', 'è', 'ê', 'ë', 'î', 'ï', 'ô', 'ù', 'û', 'ü', 'œ',
];

/// Detect the preferred language of a query
pub fn detect_language(query: &str) -> Language {
    let lower = query.to_lowercase();

    // Diacritics are a strong signal; stopwords break the remaining ties.
    let diacritics = lower.chars().filter(|c| FRENCH_DIACRITICS.contains(c)).count();

    let mut french_words = 0usize;
    let mut english_words = 0usize;
    for word in lower.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
        let word = word.split('\'').next_back().unwrap_or(word);
        if FRENCH_STOPWORDS.contains(&word) {
            french_words += 1;
        }
        if ENGLISH_STOPWORDS.contains(&word) {
            english_words += 1;
        }
    }

    let french_score = diacritics * 2 + french_words;
    if french_score > english_words {
        Language::Fr
    } else {
        Language::En
    }
}
