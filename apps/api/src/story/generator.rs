//! Story Generator — turns a user prompt into a validated `StoryData`.
//!
//! Flow per attempt: LLM completion → `extract_json` → parse → structural
//! validation → normalization. Any failure in that chain (transport, bad
//! status, unparseable text, missing keys) is retried with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::llm_client::{ChatBackend, LlmError};
use crate::models::story::{DEFAULT_AGE_RANGE, MAX_PAGE_TEXT_CHARS};
use crate::retry::RetryPolicy;
use crate::story::extract::extract_json;
use crate::story::prompts::{build_system_prompt, build_user_prompt};

/// 3 attempts, waiting 2s then 4s between them.
pub const STORY_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(2));

const REQUIRED_PAGE_KEYS: [&str; 3] = ["index", "text", "art_prompt"];

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid story structure: {0}")]
    InvalidStructure(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A single page as written by the LLM, before illustration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPage {
    pub index: u32,
    pub text: String,
    pub art_prompt: String,
}

/// Validated LLM output: exactly the requested number of pages, indexed 1..N.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryData {
    pub title: String,
    pub age_range: String,
    pub pages: Vec<DraftPage>,
}

/// Wire shape of the LLM's JSON. `age_range` is optional there.
#[derive(Debug, Deserialize)]
struct RawStory {
    title: String,
    age_range: Option<String>,
    pages: Vec<RawPage>,
}

/// The LLM's own `index` is kept only for logging; pages are renumbered by
/// position, so any JSON type is accepted there.
#[derive(Debug, Deserialize)]
struct RawPage {
    index: Value,
    text: String,
    art_prompt: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct StoryGenerator {
    backend: Arc<dyn ChatBackend>,
    retry: RetryPolicy,
}

impl StoryGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            retry: STORY_RETRY,
        }
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generates a story of exactly `max_pages` pages for `user_prompt`.
    ///
    /// Surfaces the last attempt's error once the retry budget is spent.
    pub async fn generate_story(
        &self,
        user_prompt: &str,
        max_pages: u32,
    ) -> Result<StoryData, StoryError> {
        let system = build_system_prompt(max_pages);
        let user = build_user_prompt(user_prompt);
        let mut last_error: Option<StoryError> = None;

        for attempt in 0..self.retry.max_attempts {
            match self.attempt(&system, &user, max_pages).await {
                Ok(story) => {
                    info!(
                        "Story '{}' generated with {} pages (attempt {})",
                        story.title,
                        story.pages.len(),
                        attempt + 1
                    );
                    return Ok(story);
                }
                Err(e) => {
                    warn!(
                        "Story generation attempt {}/{} failed: {e}",
                        attempt + 1,
                        self.retry.max_attempts
                    );
                    last_error = Some(e);
                }
            }

            if let Some(delay) = self.retry.delay_after(attempt) {
                info!("Retrying story generation in {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        let err = last_error.unwrap_or_else(|| {
            StoryError::InvalidStructure("no generation attempts were made".to_string())
        });
        error!("Story generation gave up: {err}");
        Err(err)
    }

    async fn attempt(
        &self,
        system: &str,
        user: &str,
        max_pages: u32,
    ) -> Result<StoryData, StoryError> {
        let raw = self.backend.complete(system, user).await?;
        parse_story(&raw, max_pages)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing and validation
// ────────────────────────────────────────────────────────────────────────────

/// Recovers, validates and normalizes a story from raw LLM text.
pub fn parse_story(raw: &str, max_pages: u32) -> Result<StoryData, StoryError> {
    let cleaned = extract_json(raw);
    debug!(
        "Processed JSON text: {}...",
        cleaned.chars().take(50).collect::<String>()
    );

    let value: Value = serde_json::from_str(&cleaned)?;
    check_required_keys(&value)?;

    let story: RawStory = serde_json::from_value(value)
        .map_err(|e| StoryError::InvalidStructure(format!("unexpected field type: {e}")))?;

    normalize(story, max_pages)
}

fn check_required_keys(value: &Value) -> Result<(), StoryError> {
    let object = value
        .as_object()
        .ok_or_else(|| StoryError::InvalidStructure("top level is not an object".to_string()))?;

    for key in ["title", "pages"] {
        if !object.contains_key(key) {
            return Err(StoryError::InvalidStructure(format!("missing '{key}'")));
        }
    }

    let pages = object["pages"]
        .as_array()
        .ok_or_else(|| StoryError::InvalidStructure("'pages' is not an array".to_string()))?;

    for (position, page) in pages.iter().enumerate() {
        for key in REQUIRED_PAGE_KEYS {
            if page.get(key).is_none() {
                return Err(StoryError::InvalidStructure(format!(
                    "page {} is missing '{key}'",
                    position + 1
                )));
            }
        }
    }

    Ok(())
}

fn normalize(story: RawStory, max_pages: u32) -> Result<StoryData, StoryError> {
    let wanted = max_pages as usize;
    let mut pages = story.pages;

    if pages.len() < wanted {
        return Err(StoryError::InvalidStructure(format!(
            "expected {wanted} pages, got {}",
            pages.len()
        )));
    }
    if pages.len() > wanted {
        warn!(
            "LLM returned {} pages, keeping the first {wanted}",
            pages.len()
        );
        pages.truncate(wanted);
    }

    let mut drafts = Vec::with_capacity(pages.len());
    for (position, page) in pages.into_iter().enumerate() {
        let chars = page.text.chars().count();
        if chars > MAX_PAGE_TEXT_CHARS {
            return Err(StoryError::InvalidStructure(format!(
                "page {} text is {chars} characters (max {MAX_PAGE_TEXT_CHARS})",
                position + 1
            )));
        }

        let index = position as u32 + 1;
        if page.index.as_u64() != Some(u64::from(index)) {
            debug!("Renumbering page {} to {index}", page.index);
        }
        drafts.push(DraftPage {
            index,
            text: page.text,
            art_prompt: page.art_prompt,
        });
    }

    let age_range = story
        .age_range
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AGE_RANGE.to_string());

    Ok(StoryData {
        title: story.title,
        age_range,
        pages: drafts,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
