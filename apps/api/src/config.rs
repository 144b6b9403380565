use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if the LLM key is missing. The image key is optional:
/// without it every illustration degrades to the placeholder.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub gemini_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Root of the publicly served `/data` tree. Illustrations land in `illustrations/`.
    pub data_dir: PathBuf,
    /// Root of the publicly served `/static` tree (holds the placeholder image).
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: optional_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            static_dir: optional_env("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        })
    }

    /// Directory generated illustrations are written to.
    pub fn illustrations_dir(&self) -> PathBuf {
        self.data_dir.join("illustrations")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and blank variables alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
