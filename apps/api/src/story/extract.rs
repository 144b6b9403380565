//! JSON recovery from free-form LLM output.
//!
//! Models are told to answer with bare JSON, but often wrap it in a code fence,
//! add a preamble, or append commentary. `extract_json` undoes all three.

use std::sync::LazyLock;

use regex::Regex;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fence pattern is valid"));

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("fence pattern is valid"));

/// Cleans an LLM reply down to the text that should parse as the story JSON.
///
/// Order:
/// 1. contents of a ```json fenced block, else
/// 2. the first top-level `{...}` object,
/// 3. any remaining fenced blocks removed,
/// 4. everything after the last `}` dropped.
pub fn extract_json(raw: &str) -> String {
    let candidate = match JSON_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => first_object_span(raw).unwrap_or(raw),
    };

    let unfenced = ANY_FENCE.replace_all(candidate, "");

    let trimmed = unfenced.trim_end();
    let truncated = match trimmed.rfind('}') {
        Some(last_brace) => &trimmed[..=last_brace],
        None => trimmed,
    };

    truncated.trim().to_string()
}

/// Returns the first brace-balanced object in `text`, ignoring braces inside
/// string literals. An object that never closes runs to the end of the text.
fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY_JSON: &str = r#"{"title": "Tilly Swims", "pages": [{"index": 1, "text": "Tilly was shy.", "art_prompt": "a turtle"}]}"#;

    #[test]
    fn test_fenced_json_block_is_recovered_exactly() {
        let raw = format!("Here is your story:\n```json\n{STORY_JSON}\n```\nEnjoy!");
        assert_eq!(extract_json(&raw), STORY_JSON);
    }

    #[test]
    fn test_trailing_prose_after_last_brace_is_dropped() {
        let raw = format!("{STORY_JSON}\n\nI hope the children enjoy this story!");
        let cleaned = extract_json(&raw);
        assert_eq!(cleaned, STORY_JSON);
        assert!(serde_json::from_str::<serde_json::Value>(&cleaned).is_ok());
    }

    #[test]
    fn test_preamble_before_object_is_dropped() {
        let raw = format!("Sure! Here it is: {STORY_JSON}");
        assert_eq!(extract_json(&raw), STORY_JSON);
    }

    #[test]
    fn test_unlabeled_fence_yields_inner_object() {
        let raw = format!("```\n{STORY_JSON}\n```");
        assert_eq!(extract_json(&raw), STORY_JSON);
    }

    #[test]
    fn test_braces_inside_strings_do_not_end_the_object() {
        let raw = r#"{"title": "The } Door", "pages": []} trailing {"other": 1}"#;
        assert_eq!(extract_json(raw), r#"{"title": "The } Door", "pages": []}"#);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let raw = r#"{"title": "Say \"hi }\"", "pages": []} bye"#;
        assert_eq!(extract_json(raw), r#"{"title": "Say \"hi }\"", "pages": []}"#);
    }

    #[test]
    fn test_unterminated_object_is_kept_to_last_brace() {
        let raw = r#"{"title": "Cut", "pages": [{"index": 1} "#;
        assert_eq!(extract_json(raw), r#"{"title": "Cut", "pages": [{"index": 1}"#);
    }

    #[test]
    fn test_text_without_json_is_returned_trimmed() {
        assert_eq!(extract_json("  no story today  "), "no story today");
    }
}
