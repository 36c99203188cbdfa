//! Error types for the linkpost library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`LinkpostError`] — **Fatal**: the pipeline run cannot produce a result
//!   (no usable content, an upstream service refused a request, bad config).
//!   Returned as `Err(LinkpostError)` from the top-level `generate*` functions.
//!
//! * [`SlideError`] — **Non-fatal**: one carousel slide failed to render but
//!   the others are fine. Stored inside [`crate::output::RenderStats`] so
//!   callers can see how many slides were requested versus delivered.
//!
//! Malformed generation output (too few insights or prompts) is neither: it
//! degrades to a shorter list or to the templated fallback and never surfaces
//! as an error.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The external collaborator that produced an [`LinkpostError::Upstream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    TextGeneration,
    ImageGeneration,
    Scrape,
    DocumentExtraction,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::TextGeneration => "text generation",
            Service::ImageGeneration => "image generation",
            Service::Scrape => "page scrape",
            Service::DocumentExtraction => "document extraction",
        };
        f.write_str(name)
    }
}

/// All fatal errors returned by the linkpost library.
#[derive(Debug, Error)]
pub enum LinkpostError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No content source resolved to text long enough for the mode.
    #[error(
        "No usable content: checked {checked} but none reached {min_chars} characters.\n\
Provide article text, a PDF, or a reachable URL."
    )]
    InsufficientContent { min_chars: usize, checked: String },

    /// A prompt-driven mode was invoked without a usable prompt.
    #[error("This mode needs a prompt of at least {min_chars} characters")]
    MissingPrompt { min_chars: usize },

    /// The uploaded document is not a PDF.
    #[error("Uploaded file is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { magic: [u8; 4] },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// An external service returned a non-success response or was unreachable.
    ///
    /// `message` already carries the HTTP status when one was received.
    #[error("{service} failed: {message}")]
    Upstream {
        service: Service,
        status: Option<u16>,
        message: String,
    },

    /// PDFium could not open or read the document.
    #[error("Failed to extract PDF text: {detail}")]
    DocumentExtraction { detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// An image payload is not valid base64 or not a data URI.
    #[error("Slide {slide} carries an invalid image payload: {detail}")]
    InvalidImagePayload { slide: usize, detail: String },

    /// ZIP assembly or extraction failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The API credential is not configured.
    #[error("API credential missing.\nSet {var} or pass an API key to the config builder.")]
    MissingCredential { var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinkpostError {
    /// Stable machine-readable code, suitable for JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LinkpostError::InsufficientContent { .. } => "insufficient_content",
            LinkpostError::MissingPrompt { .. } => "missing_prompt",
            LinkpostError::NotAPdf { .. } => "not_a_pdf",
            LinkpostError::Upstream { .. } => "upstream_error",
            LinkpostError::DocumentExtraction { .. } => "document_extraction_failed",
            LinkpostError::InvalidImagePayload { .. } => "invalid_image_payload",
            LinkpostError::Archive(_) => "archive_error",
            LinkpostError::OutputWriteFailed { .. } => "output_write_failed",
            LinkpostError::MissingCredential { .. } => "missing_credential",
            LinkpostError::InvalidConfig(_) => "invalid_config",
            LinkpostError::Internal(_) => "internal_error",
        }
    }

    /// True when the failure came from an input-validation gate, before any
    /// paid call was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LinkpostError::InsufficientContent { .. }
                | LinkpostError::MissingPrompt { .. }
                | LinkpostError::NotAPdf { .. }
        )
    }

    pub(crate) fn upstream(service: Service, status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match status {
            Some(code) => format!("HTTP {code}: {message}"),
            None => message,
        };
        LinkpostError::Upstream {
            service,
            status,
            message,
        }
    }
}

/// A non-fatal error for a single carousel slide.
///
/// The batch renderer records one of these per dropped slide and keeps going.
#[derive(Debug, Clone, Error, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SlideError {
    /// The image request itself failed.
    #[error("Slide {slide}: image request failed: {detail}")]
    RequestFailed { slide: usize, detail: String },

    /// The request succeeded but carried no image.
    #[error("Slide {slide}: response contained no image")]
    EmptyPayload { slide: usize },
}

impl SlideError {
    /// 1-based slide position the error refers to.
    pub fn slide(&self) -> usize {
        match self {
            SlideError::RequestFailed { slide, .. } | SlideError::EmptyPayload { slide } => *slide,
        }
    }
}
