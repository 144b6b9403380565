// Story generation: prompt building, LLM output recovery and validation,
// character extraction, and the end-to-end pipeline behind POST /generate.
// All LLM calls go through llm_client. No direct HTTP calls here.

pub mod characters;
pub mod extract;
pub mod generator;
pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use pipeline::StoryPipeline;
