// Prompt fragments for the image-generation model.

use crate::content_filter::is_clean;
use crate::story::characters::CharacterDescriptions;

/// Appended to every image prompt.
pub const STYLE_SUFFIX: &str = "Style: Vibrant children's picture book illustration with soft rounded edges, \
    bright cheerful colors, simple approachable shapes, friendly expressive characters with clear emotions, \
    warm golden lighting with soft shadows, clean uncluttered composition, rich texture details, \
    no text overlay, 3:4 aspect ratio, soft depth of field with the foreground in focus, \
    appealing to children ages 4-8, wholesome and engaging, professional illustration";

/// Replaces any art prompt the content filter rejects.
pub const SAFE_SCENE: &str = "a friendly cute animal character smiling in a sunny magical forest \
    with flowers and butterflies";

pub const CONTINUITY_INSTRUCTION: &str =
    "Maintain visual consistency with previous illustrations in the same story.";

fn illustrate(scene: &str) -> String {
    format!("Create a high-quality children's book illustration of {scene}.")
}

/// Builds the full image prompt for one page.
///
/// - Pages after the first re-describe every known character inline.
/// - A flagged `art_prompt` is dropped whole in favor of `SAFE_SCENE`.
/// - Pages after the first also get a continuity hint once earlier pages exist.
pub fn build_image_prompt(
    art_prompt: &str,
    page_index: u32,
    characters: &CharacterDescriptions,
    previous_prompts: &[String],
) -> String {
    let mut prompt = if !is_clean(art_prompt) {
        tracing::warn!("Potentially inappropriate art prompt filtered: {art_prompt}");
        format!("{} {STYLE_SUFFIX}", illustrate(SAFE_SCENE))
    } else if page_index > 1 && !characters.is_empty() {
        let character_details = characters
            .iter()
            .map(|(name, description)| format!("{name}: {description}"))
            .collect::<Vec<_>>()
            .join(". ");
        format!(
            "{} Maintain consistent character appearances where: {character_details}. {STYLE_SUFFIX}",
            illustrate(art_prompt)
        )
    } else {
        format!("{} {STYLE_SUFFIX}", illustrate(art_prompt))
    };

    if page_index > 1 && !previous_prompts.is_empty() {
        prompt.push(' ');
        prompt.push_str(CONTINUITY_INSTRUCTION);
    }

    prompt
}
