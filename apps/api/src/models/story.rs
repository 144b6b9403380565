use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PAGES: u32 = 8;
pub const MIN_PAGES: u32 = 2;
pub const MAX_PAGES: u32 = 10;
/// Roughly 60 words.
pub const MAX_PAGE_TEXT_CHARS: usize = 450;
pub const DEFAULT_AGE_RANGE: &str = "4-8";

/// Request body for `POST /generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryRequest {
    pub user_prompt: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

/// One page of a finished story.
///
/// `image_url` stays `None` until the illustration step has produced a
/// reference (a saved illustration or the placeholder) for this page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub index: u32,
    pub text: String,
    pub art_prompt: String,
    pub image_url: Option<String>,
}

/// The response body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub age_range: String,
    pub pages: Vec<StoryPage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_request_defaults_to_eight_pages() {
        let request: StoryRequest =
            serde_json::from_str(r#"{"user_prompt": "a brave little owl"}"#).unwrap();
        assert_eq!(request.max_pages, 8);
    }

    #[test]
    fn test_story_request_reads_explicit_page_count() {
        let request: StoryRequest =
            serde_json::from_str(r#"{"user_prompt": "a brave little owl", "max_pages": 3}"#)
                .unwrap();
        assert_eq!(request.max_pages, 3);
    }

    #[test]
    fn test_unset_image_url_serializes_as_null() {
        let page = StoryPage {
            index: 1,
            text: "Once upon a time.".to_string(),
            art_prompt: "a meadow".to_string(),
            image_url: None,
        };
        let value = serde_json::to_value(&page).unwrap();
        assert!(value["image_url"].is_null());
    }
}
