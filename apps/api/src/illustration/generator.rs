//! Illustration Generator — one picture per story page, never an error.
//!
//! Every call ends with a public image reference: either the saved PNG under
//! `/data/illustrations/` or `PLACEHOLDER_IMAGE_URL`. Failures are logged and
//! downgraded here so a bad page can never sink the whole story.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::ImageFormat;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::illustration::prompts::build_image_prompt;
use crate::illustration::provider::{GeminiImageProvider, ImageError, ImageProvider};
use crate::retry::RetryPolicy;
use crate::story::characters::CharacterDescriptions;

pub const PLACEHOLDER_IMAGE_URL: &str = "/static/placeholder_image.png";
pub const ILLUSTRATIONS_URL_PREFIX: &str = "/data/illustrations";
/// Process-wide cap on in-flight image generations.
pub const MAX_CONCURRENT_IMAGES: usize = 2;
/// 3 attempts, waiting 1s then 2s between them.
pub const IMAGE_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(1));

/// Generates and stores page illustrations.
///
/// Cloning is cheap; clones share the provider and the concurrency semaphore.
#[derive(Clone)]
pub struct Illustrator {
    /// `None` when no image API key is configured: every page gets the placeholder.
    provider: Option<Arc<dyn ImageProvider>>,
    output_dir: PathBuf,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl Illustrator {
    pub fn new(
        provider: Option<Arc<dyn ImageProvider>>,
        output_dir: PathBuf,
        semaphore: Arc<Semaphore>,
    ) -> Self {
        Self {
            provider,
            output_dir,
            semaphore,
            retry: IMAGE_RETRY,
        }
    }

    /// Wires the Gemini provider if `GEMINI_API_KEY` is set.
    pub fn from_config(config: &Config, semaphore: Arc<Semaphore>) -> Self {
        let provider = config.gemini_api_key.clone().map(|key| {
            Arc::new(GeminiImageProvider::new(key)) as Arc<dyn ImageProvider>
        });
        if provider.is_none() {
            warn!("GEMINI_API_KEY not set; illustrations will use the placeholder image");
        }
        Self::new(provider, config.illustrations_dir(), semaphore)
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Produces the image reference for one page.
    ///
    /// Holds one semaphore permit for the whole attempt sequence, backoff
    /// sleeps included.
    pub async fn generate_illustration(
        &self,
        art_prompt: &str,
        page_index: u32,
        characters: &CharacterDescriptions,
        previous_prompts: &[String],
    ) -> String {
        let prompt = build_image_prompt(art_prompt, page_index, characters, previous_prompts);

        let filename = format!("page_{page_index}_{}.png", Uuid::new_v4());
        let image_path = self.output_dir.join(&filename);
        let image_url = format!("{ILLUSTRATIONS_URL_PREFIX}/{filename}");

        let Some(provider) = self.provider.clone() else {
            return PLACEHOLDER_IMAGE_URL.to_string();
        };

        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Image semaphore closed: {e}");
                return PLACEHOLDER_IMAGE_URL.to_string();
            }
        };

        for attempt in 0..self.retry.max_attempts {
            match render_to_file(provider.clone(), prompt.clone(), image_path.clone()).await {
                Ok(()) => {
                    info!("Image for page {page_index} saved to {}", image_path.display());
                    return image_url;
                }
                Err(e) => {
                    error!(
                        "Image generation for page {page_index} failed on attempt {}/{}: {e}",
                        attempt + 1,
                        self.retry.max_attempts
                    );
                }
            }

            if let Some(delay) = self.retry.delay_after(attempt) {
                info!("Retrying page {page_index} in {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        warn!("All retries failed for page {page_index}, using placeholder");
        PLACEHOLDER_IMAGE_URL.to_string()
    }
}

/// One attempt: generate, decode and write the PNG on a blocking worker.
async fn render_to_file(
    provider: Arc<dyn ImageProvider>,
    prompt: String,
    image_path: PathBuf,
) -> Result<(), ImageError> {
    tokio::task::spawn_blocking(move || {
        let bytes = provider.generate(&prompt)?;
        save_png(&bytes, &image_path)
    })
    .await?
}

/// Decodes any supported image format and re-encodes it as PNG at `path`.
///
/// The PNG is written to a `.part` sibling and renamed into place, so `path`
/// either holds a complete image or does not exist.
fn save_png(bytes: &[u8], path: &Path) -> Result<(), ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let partial = path.with_extension("png.part");

    let written = decoded
        .save_with_format(&partial, ImageFormat::Png)
        .map_err(ImageError::from)
        .and_then(|()| std::fs::rename(&partial, path).map_err(ImageError::from));

    if written.is_err() {
        if let Err(e) = std::fs::remove_file(&partial) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove partial image {}: {e}", partial.display());
            }
        }
    }
    written
}
