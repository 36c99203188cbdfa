//! Insight extraction: one request, one parsed list of at most six entries.
//!
//! Short or empty replies are accepted as-is. Callers must tolerate fewer
//! than six insights; the image-prompt fallback covers the gap downstream.

use super::acquire::ContentBlock;
use super::llm::TextCall;
use super::postprocess::{parse_list_capped, ListMarkers};
use crate::error::LinkpostError;
use crate::prompts;
use tracing::{info, warn};

/// Article chars sent to the extractor.
pub const INSIGHTS_BUDGET: usize = 3000;

/// Which instruction the extractor runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    /// Short, data-driven statistics for carousel slides.
    Stats,
    /// Finding + implication pairs for the image-prompt mode.
    Findings,
}

impl InsightKind {
    fn system_prompt(self) -> &'static str {
        match self {
            InsightKind::Stats => prompts::INSIGHTS_SYSTEM_PROMPT,
            InsightKind::Findings => prompts::FINDINGS_SYSTEM_PROMPT,
        }
    }
}

/// Parsed insights plus the raw reply they were parsed from.
///
/// The raw text is what gets quoted back to the model when writing image
/// prompts, so nothing the parser dropped is lost there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insights {
    pub items: Vec<String>,
    pub raw: String,
}

/// Ask for six insights and parse the reply.
pub async fn extract_insights(
    call: &TextCall<'_>,
    content: &ContentBlock,
    kind: InsightKind,
    cap: usize,
) -> Result<Insights, LinkpostError> {
    let raw = call
        .ask(
            "insights",
            kind.system_prompt(),
            content.excerpt(INSIGHTS_BUDGET),
        )
        .await?;

    let items = parse_list_capped(&raw, ListMarkers::Basic, cap);
    if items.len() < cap {
        warn!("Insight extraction returned {} of {} entries", items.len(), cap);
    } else {
        info!("Extracted {} insights", items.len());
    }
    Ok(Insights { items, raw })
}
