//! Post Composer styles.
//!
//! A style is a fixed pairing of instruction templates and formatting
//! budgets. The set is closed: lookups by key go through [`PostStyle::from_key`],
//! which falls back to [`PostStyle::SummaryHighlights`] for anything unknown.

use crate::prompts;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest allowed opening line, i.e. what shows before "see more" on mobile.
pub const OPENING_LINE_MAX_CHARS: usize = 110;

/// Instruction templates and formatting budgets for one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    pub key: &'static str,
    /// Style-specific structure, combined with the shared rules at call time.
    pub system_prompt: &'static str,
    /// Label placed in front of the interpolated content in the user message.
    pub content_label: &'static str,
    pub min_chars: usize,
    pub max_chars: usize,
    pub max_opening_chars: usize,
    /// Whether apostrophe contractions ("it's", "don't") are forbidden.
    pub forbid_contractions: bool,
}

impl StyleSpec {
    /// Build the user message for this style, with content already truncated.
    pub fn user_message(&self, content: &str) -> String {
        format!("{}: {}", self.content_label, content)
    }
}

/// The closed set of styled-post variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostStyle {
    #[default]
    SummaryHighlights,
    BreakingSignal,
    InsiderNarrative,
    DeepAnalysis,
    CommunityDiscussion,
    FutureSignal,
}

impl PostStyle {
    pub const ALL: [PostStyle; 6] = [
        PostStyle::SummaryHighlights,
        PostStyle::BreakingSignal,
        PostStyle::InsiderNarrative,
        PostStyle::DeepAnalysis,
        PostStyle::CommunityDiscussion,
        PostStyle::FutureSignal,
    ];

    /// Resolve a style key. Unknown or missing keys fall back to the default style.
    pub fn from_key(key: Option<&str>) -> Self {
        match key.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            Some("summary-highlights") => PostStyle::SummaryHighlights,
            Some("breaking-signal") => PostStyle::BreakingSignal,
            Some("insider-narrative") => PostStyle::InsiderNarrative,
            Some("deep-analysis") => PostStyle::DeepAnalysis,
            Some("community-discussion") => PostStyle::CommunityDiscussion,
            Some("future-signal") => PostStyle::FutureSignal,
            _ => PostStyle::default(),
        }
    }

    pub fn spec(self) -> StyleSpec {
        let (key, system_prompt, content_label, min_chars, max_chars) = match self {
            PostStyle::SummaryHighlights => (
                "summary-highlights",
                prompts::SUMMARY_HIGHLIGHTS_PROMPT,
                "ARTICLE TO SUMMARIZE",
                1200,
                1500,
            ),
            PostStyle::BreakingSignal => (
                "breaking-signal",
                prompts::BREAKING_SIGNAL_PROMPT,
                "TOPIC/ARTICLE",
                1200,
                1500,
            ),
            PostStyle::InsiderNarrative => (
                "insider-narrative",
                prompts::INSIDER_NARRATIVE_PROMPT,
                "TOPIC/ARTICLE",
                1300,
                1800,
            ),
            PostStyle::DeepAnalysis => (
                "deep-analysis",
                prompts::DEEP_ANALYSIS_PROMPT,
                "TOPIC/ARTICLE",
                1400,
                1800,
            ),
            PostStyle::CommunityDiscussion => (
                "community-discussion",
                prompts::COMMUNITY_DISCUSSION_PROMPT,
                "TOPIC/ARTICLE",
                1300,
                1600,
            ),
            PostStyle::FutureSignal => (
                "future-signal",
                prompts::FUTURE_SIGNAL_PROMPT,
                "TOPIC/ARTICLE",
                1200,
                1500,
            ),
        };
        StyleSpec {
            key,
            system_prompt,
            content_label,
            min_chars,
            max_chars,
            max_opening_chars: OPENING_LINE_MAX_CHARS,
            forbid_contractions: false,
        }
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }
}

impl fmt::Display for PostStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Budgets for posts written straight from a prompt or from a structured
/// summary. Neither goes through the style registry, but both are linted.
pub fn freeform_spec() -> StyleSpec {
    StyleSpec {
        key: "post-only",
        system_prompt: prompts::POST_ONLY_SYSTEM_PROMPT,
        content_label: "PROMPT",
        min_chars: 1200,
        max_chars: 1500,
        max_opening_chars: OPENING_LINE_MAX_CHARS,
        forbid_contractions: true,
    }
}

pub fn structured_summary_spec() -> StyleSpec {
    StyleSpec {
        key: "structured-summary",
        system_prompt: prompts::YOLO_POST_SYSTEM_PROMPT,
        content_label: "ARTICLE SUMMARY",
        min_chars: 1200,
        max_chars: 1500,
        max_opening_chars: OPENING_LINE_MAX_CHARS,
        forbid_contractions: false,
    }
}

/// Narrative angles a structured-summary post can take.
pub const NARRATIVE_ANGLES: [&str; 5] = [
    "Lead with the Number",
    "The Reframe",
    "Connect the Dots",
    "Before and After",
    "The Implication Chain",
];

/// Use the requested angle, or pick one at random.
pub fn pick_angle(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(angle) if !angle.is_empty() => angle.to_string(),
        _ => NARRATIVE_ANGLES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(NARRATIVE_ANGLES[0])
            .to_string(),
    }
}
