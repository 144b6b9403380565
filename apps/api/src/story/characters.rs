//! Character Extractor — mines "Name the noun" style phrases from the opening
//! pages so later illustration prompts can re-describe the same characters.
//!
//! Capitalization is the only signal, so any sentence-initial word followed by a
//! lowercase word ("She lived ...") is also picked up. Best effort only.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::story::generator::DraftPage;

/// Character name → short description. Ordered so prompts built from it are stable.
pub type CharacterDescriptions = BTreeMap<String, String>;

/// Only the opening pages are scanned; that is where characters get introduced.
const PAGES_TO_SCAN: usize = 3;
const DESCRIPTION_CHARS: usize = 100;

static CHARACTER_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+ (?:[A-Z][a-z]+ )?(?:the |is a |was a )?[a-z]+")
        .expect("character pattern is valid")
});

/// Extracts `name → description` pairs from the first three pages.
///
/// The description is the text following the first mention of the matched
/// phrase, up to 100 characters and cut at the first period. A later match for
/// the same name replaces the earlier description.
pub fn extract_characters(pages: &[DraftPage]) -> CharacterDescriptions {
    let mut characters = CharacterDescriptions::new();

    for page in pages.iter().take(PAGES_TO_SCAN) {
        let combined = format!("{} {}", page.text, page.art_prompt);

        for phrase in CHARACTER_PHRASE.find_iter(&combined) {
            let phrase = phrase.as_str();
            let Some(name) = phrase.split(' ').next() else {
                continue;
            };
            if !name.starts_with(|c: char| c.is_uppercase()) {
                continue;
            }
            let Some(start) = combined.find(phrase) else {
                continue;
            };

            let window: String = combined[start..].chars().take(DESCRIPTION_CHARS).collect();
            let description = window.split('.').next().unwrap_or_default().to_string();
            characters.insert(name.to_string(), description);
        }
    }

    characters
}
