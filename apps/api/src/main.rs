mod config;
mod content_filter;
mod errors;
mod illustration;
mod llm_client;
mod models;
mod retry;
mod routes;
mod state;
mod story;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::illustration::{ensure_placeholder, Illustrator, MAX_CONCURRENT_IMAGES};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::story::generator::StoryGenerator;
use crate::story::StoryPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Storybook API v{}", env!("CARGO_PKG_VERSION"));

    // Prepare on-disk asset directories
    let illustrations_dir = config.illustrations_dir();
    std::fs::create_dir_all(&illustrations_dir).with_context(|| {
        format!("Failed to create {}", illustrations_dir.display())
    })?;
    let placeholder = ensure_placeholder(&config.static_dir)
        .context("Failed to prepare placeholder illustration")?;
    info!(
        "Illustrations stored in {}, placeholder at {}",
        illustrations_dir.display(),
        placeholder.display()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.groq_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // One semaphore for the whole process: all requests share the image-generation slots
    let image_slots = Arc::new(Semaphore::new(MAX_CONCURRENT_IMAGES));
    let illustrator = Illustrator::from_config(&config, image_slots);
    info!(
        "Illustrator initialized (model: {}, max concurrent: {})",
        illustration::provider::IMAGE_MODEL,
        MAX_CONCURRENT_IMAGES
    );

    let pipeline = StoryPipeline::new(StoryGenerator::new(Arc::new(llm)), illustrator);

    // Build app state
    let state = AppState {
        pipeline,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
