use crate::config::Config;
use crate::story::StoryPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The pipeline's illustrator holds the process-wide image semaphore, so every
/// request handled by this process competes for the same permits.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: StoryPipeline,
    pub config: Config,
}
