//! Content acquisition: pick the first content source long enough to use.
//!
//! Sources are tried in [`Mode::sources`] order. Only sources the caller
//! actually supplied are consulted, so a request without a URL never
//! triggers a scrape and one without a document never touches pdfium.

use crate::error::LinkpostError;
use crate::request::{ContentSource, GenerationRequest, Mode};
use crate::service::{DocumentExtractor, PageScraper};
use tracing::{debug, info};

/// The normalised text the rest of the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    text: String,
    source: ContentSource,
}

impl ContentBlock {
    pub fn new(text: impl Into<String>, source: ContentSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> ContentSource {
        self.source
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The first `max_chars` chars, never splitting a code point.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        truncate_chars(&self.text, max_chars)
    }
}

/// Slice `s` to at most `max_chars` chars.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Resolve the request to a single [`ContentBlock`].
///
/// # Errors
/// - [`LinkpostError::MissingPrompt`] for prompt-driven modes without a usable prompt.
/// - [`LinkpostError::InsufficientContent`] when no source reaches the threshold.
/// - Any scrape or extraction failure, unchanged.
pub async fn acquire(
    request: &GenerationRequest,
    scraper: &dyn PageScraper,
    extractor: &dyn DocumentExtractor,
) -> Result<ContentBlock, LinkpostError> {
    let mode = request.mode;
    let min_chars = mode.min_chars();
    let mut checked: Vec<ContentSource> = Vec::new();

    for &source in mode.sources() {
        let candidate = match source {
            ContentSource::Prompt => non_blank(request.prompt.as_deref()).map(str::to_string),
            ContentSource::Text => non_blank(request.text.as_deref()).map(str::to_string),
            ContentSource::Topic => non_blank(request.topic.as_deref()).map(str::to_string),
            ContentSource::Document => match request.document.as_deref() {
                Some(bytes) if !bytes.is_empty() => Some(extractor.extract(bytes).await?.text),
                _ => None,
            },
            ContentSource::Url => match non_blank(request.url.as_deref()) {
                Some(url) => Some(scraper.scrape(url).await?.into_content()),
                None => None,
            },
        };

        let Some(candidate) = candidate else {
            continue;
        };
        checked.push(source);

        let text = candidate.trim();
        let len = text.chars().count();
        if len >= min_chars {
            info!("Using {} ({} chars)", source, len);
            return Ok(ContentBlock::new(text, source));
        }
        debug!("Skipping {}: {} chars < {}", source, len, min_chars);
    }

    Err(insufficient(mode, min_chars, &checked))
}

fn insufficient(mode: Mode, min_chars: usize, checked: &[ContentSource]) -> LinkpostError {
    if mode.sources().contains(&ContentSource::Prompt) {
        return LinkpostError::MissingPrompt { min_chars };
    }
    let checked = if checked.is_empty() {
        "no content source".to_string()
    } else {
        checked
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    LinkpostError::InsufficientContent { min_chars, checked }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
