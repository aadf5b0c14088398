// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Keyword lookup tables for inferring offer attributes from free text.
//!
//! Explicit data instead of scattered string-contains checks: adding a new
//! locale or synonym is one row in a table here.

/// Multi-word grade phrases, checked before the short codes.
const CONDITION_PHRASES: &[(&str, &str)] = &[
    ("near mint", "NM"),
    ("lightly played", "LP"),
    ("moderately played", "MP"),
    ("heavily played", "HP"),
    ("poor", "PO"),
    ("damaged", "PO"),
];

/// Short grade codes. These only match as standalone tokens so that "help"
/// never reads as LP.
const CONDITION_CODES: &[(&str, &str)] = &[
    ("nm", "NM"),
    ("lp", "LP"),
    ("mp", "MP"),
    ("hp", "HP"),
    ("po", "PO"),
];

const LANGUAGE_SYNONYMS: &[(&str, &str)] = &[
    ("français", "Français"),
    ("francais", "Français"),
    ("french", "Français"),
    ("english", "English"),
    ("anglais", "English"),
    ("deutsch", "Deutsch"),
    ("german", "Deutsch"),
    ("allemand", "Deutsch"),
    ("italiano", "Italiano"),
    ("italian", "Italiano"),
    ("italien", "Italiano"),
    ("español", "Español"),
    ("espanol", "Español"),
    ("spanish", "Español"),
    ("espagnol", "Español"),
    ("japanese", "Japanese"),
    ("japonais", "Japanese"),
];

const FIRST_EDITION_PHRASES: &[&str] = &[
    "1st edition",
    "first edition",
    "première édition",
    "premiere edition",
    "1ere edition",
    "1ère édition",
    "1st ed",
    "first ed",
];

/// Canonical condition grade mentioned in `text`, if any.
pub fn condition_from_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    for (phrase, canonical) in CONDITION_PHRASES {
        if lower.contains(phrase) {
            return Some(canonical);
        }
    }
    for token in lower.split(|c: char| !c.is_alphanumeric()) {
        for (code, canonical) in CONDITION_CODES {
            if token == *code {
                return Some(canonical);
            }
        }
    }
    None
}

/// Canonical language mentioned in `text`, if any.
pub fn language_from_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    LANGUAGE_SYNONYMS
        .iter()
        .find(|(synonym, _)| lower.contains(synonym))
        .map(|(_, canonical)| *canonical)
}

/// Whether `text` mentions a first-edition printing.
pub fn first_edition_from_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    FIRST_EDITION_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_from_phrases_and_codes() {
        assert_eq!(condition_from_text("Near Mint condition"), Some("NM"));
        assert_eq!(condition_from_text("état: NM"), Some("NM"));
        assert_eq!(condition_from_text("Lightly Played copy"), Some("LP"));
        assert_eq!(condition_from_text("damaged corners"), Some("PO"));
        assert_eq!(condition_from_text("nothing here"), None);
    }

    #[test]
    fn short_codes_do_not_match_inside_words() {
        assert_eq!(condition_from_text("helpful seller"), None);
        assert_eq!(condition_from_text("camping trip"), None);
    }

    #[test]
    fn languages_across_locales() {
        assert_eq!(language_from_text("Sprache: Deutsch"), Some("Deutsch"));
        assert_eq!(language_from_text("carte en anglais"), Some("English"));
        assert_eq!(language_from_text("Español, casi nueva"), Some("Español"));
        assert_eq!(language_from_text("no language here"), None);
    }

    #[test]
    fn first_edition_variants() {
        assert!(first_edition_from_text("1st Edition holo"));
        assert!(first_edition_from_text("Première Édition"));
        assert!(!first_edition_from_text("unlimited print"));
    }
}
