// Illustration pipeline: prompt enrichment, blocking image providers,
// bounded-concurrency generation with retry, and on-disk persistence.
// Provider calls are blocking and must run inside tokio::task::spawn_blocking.

pub mod generator;
pub mod placeholder;
pub mod prompts;
pub mod provider;

pub use generator::{Illustrator, MAX_CONCURRENT_IMAGES};
pub use placeholder::ensure_placeholder;
