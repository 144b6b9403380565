//! Shared fakes for unit tests: a scripted chat backend, an instrumented image
//! provider, and fixture builders.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::illustration::provider::{ImageError, ImageProvider};
use crate::llm_client::{ChatBackend, LlmError};

/// A valid story JSON with `pages` pages, each with a short text and art prompt.
pub fn story_json(pages: u32) -> String {
    let pages: Vec<_> = (1..=pages)
        .map(|i| {
            serde_json::json!({
                "index": i,
                "text": format!("Tilly the turtle paddled a little further on day {i}. The pond felt warm."),
                "art_prompt": format!("Tilly the turtle, a small green turtle with a yellow scarf, swimming in a sunny pond, scene {i}"),
            })
        })
        .collect();
    serde_json::json!({ "title": "Tilly Learns to Swim", "pages": pages }).to_string()
}

/// A 2x2 PNG.
pub fn tiny_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(2, 2, Rgba([120, 200, 90, 255]));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encoding a tiny png cannot fail");
    buffer.into_inner()
}

// ────────────────────────────────────────────────────────────────────────────
// ScriptedChat
// ────────────────────────────────────────────────────────────────────────────

/// Replays a fixed list of replies, one per `complete` call.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
    last_prompts: Mutex<Option<(String, String)>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_prompts: Mutex::new(None),
        }
    }

    pub fn server_error() -> LlmError {
        LlmError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.last_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompts.lock().unwrap() = Some((system.to_string(), user.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MockImageProvider
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed payload, optionally failing the first N calls and sleeping
/// to simulate latency. Tracks how many calls overlap.
pub struct MockImageProvider {
    payload: Vec<u8>,
    fail_first: usize,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockImageProvider {
    pub fn returning(payload: Vec<u8>) -> Self {
        Self {
            payload,
            fail_first: 0,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl ImageProvider for MockImageProvider {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if call < self.fail_first {
            return Err(ImageError::NoImage);
        }
        Ok(self.payload.clone())
    }
}
