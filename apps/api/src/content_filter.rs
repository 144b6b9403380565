//! Content Filter — word-level denylist for text shown to, or drawn for, children.
//!
//! Heuristic safety net only. Matching is per whole word, so false positives
//! and negatives are expected.

use std::sync::LazyLock;

use regex::Regex;

const INAPPROPRIATE_PATTERNS: &[&str] = &[
    r"\b(death|dead|kill|murder|blood|gore|scary|horror|monster|nightmare|gun|weapon)\b",
    r"\b(violence|violent|hurt|pain|suffer|cruel|evil|devil|demon|hell)\b",
];

static DENYLIST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    INAPPROPRIATE_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("denylist pattern is valid"))
        .collect()
});

/// Returns `true` if `text` contains none of the denylisted words (case-insensitive).
pub fn is_clean(text: &str) -> bool {
    let lowered = text.to_lowercase();
    !DENYLIST.iter().any(|re| re.is_match(&lowered))
}
