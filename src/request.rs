//! What the caller asks for: content sources plus the pipeline variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which pipeline variant a [`GenerationRequest`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Facts summary, styled post, insights, generated image prompts, carousel.
    #[default]
    Custom,
    /// Structured JSON extraction feeding a narrative-angle post, then the carousel.
    Yolo,
    /// Insights and image prompts only; nothing is rendered.
    ImagePrompts,
    /// One post written straight from the caller's prompt.
    PostOnly,
    /// Rewrite a single image prompt to match the brand style.
    ImproveImagePrompt,
    /// Render a single image from the caller's prompt.
    ImageOnly,
}

impl Mode {
    /// Minimum trimmed length the winning content source must reach.
    pub fn min_chars(self) -> usize {
        match self {
            Mode::Custom | Mode::Yolo => 100,
            Mode::ImagePrompts => 50,
            Mode::PostOnly | Mode::ImproveImagePrompt | Mode::ImageOnly => 20,
        }
    }

    /// Sources this mode reads, highest priority first.
    pub fn sources(self) -> &'static [ContentSource] {
        match self {
            Mode::Custom | Mode::Yolo | Mode::ImagePrompts => &[
                ContentSource::Text,
                ContentSource::Document,
                ContentSource::Url,
                ContentSource::Topic,
            ],
            Mode::PostOnly | Mode::ImproveImagePrompt | Mode::ImageOnly => &[ContentSource::Prompt],
        }
    }

    /// Whether this mode ends with a rendered carousel.
    pub fn renders_carousel(self) -> bool {
        matches!(self, Mode::Custom | Mode::Yolo)
    }

    /// Parse the kebab-case key used on the wire and on the command line.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "custom" | "" => Some(Mode::Custom),
            "yolo" => Some(Mode::Yolo),
            "image-prompts" | "generate-image-prompts" => Some(Mode::ImagePrompts),
            "post-only" => Some(Mode::PostOnly),
            "improve-image-prompt" | "improve-prompt" => Some(Mode::ImproveImagePrompt),
            "image-only" => Some(Mode::ImageOnly),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Mode::Custom => "custom",
            Mode::Yolo => "yolo",
            Mode::ImagePrompts => "image-prompts",
            Mode::PostOnly => "post-only",
            Mode::ImproveImagePrompt => "improve-image-prompt",
            Mode::ImageOnly => "image-only",
        };
        f.write_str(key)
    }
}

/// One of the places content can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Prompt,
    Text,
    Document,
    Url,
    Topic,
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentSource::Prompt => "prompt",
            ContentSource::Text => "pasted text",
            ContentSource::Document => "document",
            ContentSource::Url => "url",
            ContentSource::Topic => "topic",
        };
        f.write_str(name)
    }
}

/// A single pipeline invocation.
///
/// Every field is optional; which ones matter depends on [`Mode::sources`].
///
/// # Example
/// ```rust
/// use linkpost::{GenerationRequest, Mode};
///
/// let request = GenerationRequest::new(Mode::Custom)
///     .with_url("https://example.com/article")
///     .with_style("deep-analysis");
/// assert_eq!(request.style.as_deref(), Some("deep-analysis"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub mode: Mode,
    /// Text-generation model id. Falls back to the configured default.
    #[serde(default)]
    pub model: Option<String>,
    /// Explicitly supplied article text.
    #[serde(default)]
    pub text: Option<String>,
    /// Raw bytes of an uploaded PDF.
    #[serde(default, skip_serializing)]
    pub document: Option<Vec<u8>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    /// Free-form prompt for the prompt-driven modes.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Post Composer style key (see [`crate::style::PostStyle`]).
    #[serde(default)]
    pub style: Option<String>,
    /// Narrative angle for [`Mode::Yolo`]. Random when absent.
    #[serde(default)]
    pub angle: Option<String>,
}

impl GenerationRequest {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_document(mut self, bytes: Vec<u8>) -> Self {
        self.document = Some(bytes);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_angle(mut self, angle: impl Into<String>) -> Self {
        self.angle = Some(angle.into());
        self
    }
}
