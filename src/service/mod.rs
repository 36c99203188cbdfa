//! External collaborators, seen by the pipeline as opaque request/response services.
//!
//! Each collaborator is a trait so the pipeline can be driven by the real
//! HTTP-backed implementations in production and by in-process fakes in
//! tests. The defaults are:
//!
//! | Trait | Default implementation |
//! |-------|------------------------|
//! | [`TextGenerator`]     | [`venice::VeniceClient`] (`/chat/completions`) |
//! | [`ImageGenerator`]    | [`venice::VeniceClient`] (`/image/generate`) |
//! | [`PageScraper`]       | [`scrape::HttpScraper`] |
//! | [`DocumentExtractor`] | [`document::PdfiumExtractor`] |
//!
//! None of them retry. A failed call surfaces as
//! [`LinkpostError::Upstream`](crate::error::LinkpostError::Upstream) and the
//! caller decides whether that aborts the run.

pub mod document;
pub mod scrape;
pub mod venice;

use crate::error::LinkpostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use document::{DocumentText, PdfiumExtractor};
pub use scrape::{HttpScraper, ScrapedPage};
pub use venice::VeniceClient;

// ── Wire types ───────────────────────────────────────────────────────────

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice. An empty or contentless response degrades to "".
    pub fn into_text(self) -> String {
        match self.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(text) => text,
            None => {
                warn!("Text generation returned no content; continuing with empty output");
                String::new()
            }
        }
    }
}

/// Body of an image-generation request.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub resolution: &'a str,
    pub aspect_ratio: &'a str,
    pub steps: u32,
    pub cfg_scale: f32,
    pub safe_mode: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageResponse {
    /// Base64-encoded images. Usually exactly one.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ImageResponse {
    /// First non-empty payload, if any.
    pub fn first_image(self) -> Option<String> {
        self.images.into_iter().find(|b64| !b64.trim().is_empty())
    }
}

// ── Collaborator traits ──────────────────────────────────────────────────

/// Chat-style text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `messages` to `model` and return the generated text.
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LinkpostError>;
}

/// Single-prompt image generation with fixed implicit parameters.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, LinkpostError>;
}

/// Fetch a web page and reduce it to title + body text.
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, LinkpostError>;
}

/// Pull plain text out of an uploaded document.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<DocumentText, LinkpostError>;
}
