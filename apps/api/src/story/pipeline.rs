//! Story Pipeline — orchestrates one `/generate` request end to end.
//!
//! Flow: validate request → generate story → extract characters →
//!       illustrate pages one at a time, in index order → assemble `Story`.
//!
//! Illustrations run sequentially: page N+1 starts only after page N
//! has a final reference, and its prompt carries the art prompts used so far.

use tracing::info;

use crate::content_filter::is_clean;
use crate::errors::AppError;
use crate::illustration::Illustrator;
use crate::models::story::{Story, StoryPage, StoryRequest, MAX_PAGES, MIN_PAGES};
use crate::story::characters::extract_characters;
use crate::story::generator::StoryGenerator;

const MIN_PROMPT_CHARS: usize = 3;

#[derive(Clone)]
pub struct StoryPipeline {
    generator: StoryGenerator,
    illustrator: Illustrator,
}

impl StoryPipeline {
    pub fn new(generator: StoryGenerator, illustrator: Illustrator) -> Self {
        Self {
            generator,
            illustrator,
        }
    }

    /// Runs the full pipeline. Image failures never surface here; they
    /// degrade to the placeholder reference inside the illustrator.
    pub async fn generate(&self, request: StoryRequest) -> Result<Story, AppError> {
        validate_request(&request)?;
        let prompt = request.user_prompt.trim();

        let story = self
            .generator
            .generate_story(prompt, request.max_pages)
            .await?;

        let characters = extract_characters(&story.pages);
        info!("Extracted characters: {characters:?}");

        let total = story.pages.len();
        info!("Generating images for {total} pages sequentially");

        let mut used_prompts: Vec<String> = Vec::with_capacity(total);
        let mut pages = Vec::with_capacity(total);

        for page in story.pages {
            info!(
                "Processing page {}/{total}: {}...",
                page.index,
                page.art_prompt.chars().take(50).collect::<String>()
            );

            let image_url = self
                .illustrator
                .generate_illustration(&page.art_prompt, page.index, &characters, &used_prompts)
                .await;
            info!("Completed page {}/{total}: {image_url}", page.index);

            used_prompts.push(page.art_prompt.clone());
            pages.push(StoryPage {
                index: page.index,
                text: page.text,
                art_prompt: page.art_prompt,
                image_url: Some(image_url),
            });
        }

        Ok(Story {
            title: story.title,
            age_range: story.age_range,
            pages,
        })
    }
}

/// Rejects prompts that are too short or flagged, and page counts outside [2, 10].
pub fn validate_request(request: &StoryRequest) -> Result<(), AppError> {
    if request.user_prompt.trim().chars().count() < MIN_PROMPT_CHARS {
        return Err(AppError::Validation(
            "Please provide a valid story prompt".to_string(),
        ));
    }

    if !(MIN_PAGES..=MAX_PAGES).contains(&request.max_pages) {
        return Err(AppError::Validation(format!(
            "max_pages must be between {MIN_PAGES} and {MAX_PAGES}"
        )));
    }

    if !is_clean(&request.user_prompt) {
        return Err(AppError::Validation(
            "Your prompt contains content that isn't appropriate for children".to_string(),
        ));
    }

    Ok(())
}
