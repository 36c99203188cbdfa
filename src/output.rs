//! Result types returned by a generation run.

use crate::error::{LinkpostError, SlideError};
use crate::pipeline::encode;
use crate::pipeline::postprocess::FormatViolation;
use crate::request::Mode;
use serde::{Deserialize, Serialize};

/// One image-generation prompt, at most ~80 words.
pub type ImagePrompt = String;

/// One rendered carousel slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// 1-based position of the prompt that produced this image.
    pub slide: usize,
    pub prompt: ImagePrompt,
    /// Base64 payload exactly as the image service returned it.
    pub data: String,
}

impl GeneratedImage {
    /// Payload as a `data:` URI, for embedding in HTML or JSON consumers.
    pub fn data_uri(&self) -> String {
        if self.data.starts_with("data:") {
            return self.data.clone();
        }
        let bytes = self.bytes().unwrap_or_default();
        format!("data:{};base64,{}", encode::sniff_format(&bytes).mime(), self.data)
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, LinkpostError> {
        encode::decode_payload(&self.data).map_err(|detail| LinkpostError::InvalidImagePayload {
            slide: self.slide,
            detail,
        })
    }
}

/// Requested versus delivered slides for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStats {
    pub requested: usize,
    pub rendered: usize,
    /// One entry per slide left out of the carousel.
    pub dropped: Vec<SlideError>,
}

impl RenderStats {
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty() && self.rendered == self.requested
    }
}

/// Terminal output of one pipeline run.
///
/// Which fields are populated depends on [`Mode`]; the rest stay empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub mode: Mode,

    /// Model id the text-generation calls were sent to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,

    /// Finished post text.
    #[serde(default)]
    pub post: String,

    /// Rendered slides in prompt order. Dropped slides are absent, not padded.
    #[serde(default)]
    pub images: Vec<GeneratedImage>,

    /// Extracted insights, at most six.
    #[serde(default)]
    pub stats: Vec<String>,

    /// Facts summary (custom) or structured extraction JSON (yolo).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// The six prompts handed to the renderer, or returned as-is in image-prompts mode.
    #[serde(default)]
    pub image_prompts: Vec<ImagePrompt>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved_prompt: Option<String>,

    #[serde(default)]
    pub render: RenderStats,

    /// Formatting rules the post breaks. Reported, never repaired.
    #[serde(default)]
    pub format_warnings: Vec<FormatViolation>,
}

impl GenerationOutput {
    pub(crate) fn new(mode: Mode, model: Option<String>) -> Self {
        Self {
            mode,
            model,
            ..Default::default()
        }
    }

    /// True when at least one slide was requested but not delivered.
    pub fn is_partial(&self) -> bool {
        !self.render.dropped.is_empty()
    }

    /// Base64 payloads in carousel order, ready for [`crate::archive::package_slides`].
    pub fn image_payloads(&self) -> Vec<String> {
        self.images.iter().map(|img| img.data.clone()).collect()
    }
}
