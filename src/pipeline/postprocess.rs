//! Post-processing of free-form model output.
//!
//! Two jobs live here:
//!
//! - [`parse_list`] turns a numbered or bulleted reply into clean entries.
//!   The model is asked for "one per line, no numbering" and ignores that
//!   often enough that every list goes through this.
//! - [`lint_post`] checks a finished post against its style's formatting
//!   budgets. Violations are reported to the caller and logged; the post is
//!   never rewritten.

use crate::style::StyleSpec;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── List parsing ─────────────────────────────────────────────────────────

/// Which leading-marker pattern to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarkers {
    /// Dashes, asterisks, digits, dots, closing parens, and whitespace.
    Basic,
    /// [`ListMarkers::Basic`] plus a trailing ordinal label such as `1:` or `1：`.
    Rich,
}

static RE_BASIC_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\-\*\d\.\)\s]+").unwrap());

static RE_RICH_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\-\*\d\.\)\s]+\d*[：:\.]?\s*").unwrap());

/// Split on newlines, strip leading markers, drop empties. Order is kept.
///
/// The result is not capped; callers truncate to the cardinality they need.
pub fn parse_list(text: &str, markers: ListMarkers) -> Vec<String> {
    let re = match markers {
        ListMarkers::Basic => &*RE_BASIC_MARKER,
        ListMarkers::Rich => &*RE_RICH_MARKER,
    };
    normalise_line_endings(text)
        .lines()
        .map(|line| re.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// [`parse_list`] truncated to `cap` entries.
pub fn parse_list_capped(text: &str, markers: ListMarkers, cap: usize) -> Vec<String> {
    let mut items = parse_list(text, markers);
    items.truncate(cap);
    items
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Fenced replies ───────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|markdown)?\n(.*)\n```\s*$").unwrap());

/// Remove an outer code fence the model wrapped around its reply.
pub fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

// ── Post lint ────────────────────────────────────────────────────────────

/// Hype words every style forbids.
pub const BANNED_PHRASES: [&str; 6] = [
    "game-changer",
    "game changer",
    "paradigm shift",
    "revolutionary",
    "exciting",
    "thrilled",
];

static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)(#[\p{L}\p{N}_]+)").unwrap());

static RE_CONTRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[a-z]+['’](?:s|t|re|ve|ll|d|m)\b").unwrap());

/// One broken formatting rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FormatViolation {
    OpeningLineTooLong { chars: usize, max: usize },
    TooShort { chars: usize, min: usize },
    TooLong { chars: usize, max: usize },
    EmDash,
    Hashtag { tag: String },
    BannedPhrase { phrase: String },
    Contraction { word: String },
    MissingClosingQuestion,
}

impl fmt::Display for FormatViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatViolation::OpeningLineTooLong { chars, max } => {
                write!(f, "opening line is {chars} chars (max {max})")
            }
            FormatViolation::TooShort { chars, min } => {
                write!(f, "post is {chars} chars (min {min})")
            }
            FormatViolation::TooLong { chars, max } => {
                write!(f, "post is {chars} chars (max {max})")
            }
            FormatViolation::EmDash => f.write_str("contains an em dash"),
            FormatViolation::Hashtag { tag } => write!(f, "contains hashtag {tag}"),
            FormatViolation::BannedPhrase { phrase } => write!(f, "uses banned phrase \"{phrase}\""),
            FormatViolation::Contraction { word } => write!(f, "uses contraction \"{word}\""),
            FormatViolation::MissingClosingQuestion => f.write_str("does not end with a question"),
        }
    }
}

/// Check `post` against the budgets in `spec`.
///
/// Lengths are counted in chars. An empty post reports only its length.
pub fn lint_post(post: &str, spec: &StyleSpec) -> Vec<FormatViolation> {
    let post = post.trim();
    let chars = post.chars().count();
    let mut violations = Vec::new();

    if chars < spec.min_chars {
        violations.push(FormatViolation::TooShort {
            chars,
            min: spec.min_chars,
        });
    }
    if chars > spec.max_chars {
        violations.push(FormatViolation::TooLong {
            chars,
            max: spec.max_chars,
        });
    }
    if post.is_empty() {
        return violations;
    }

    let opening = post.lines().next().unwrap_or_default().trim().chars().count();
    if opening > spec.max_opening_chars {
        violations.push(FormatViolation::OpeningLineTooLong {
            chars: opening,
            max: spec.max_opening_chars,
        });
    }

    if post.contains('\u{2014}') {
        violations.push(FormatViolation::EmDash);
    }

    for caps in RE_HASHTAG.captures_iter(post) {
        violations.push(FormatViolation::Hashtag {
            tag: caps[1].to_string(),
        });
    }

    let lowered = post.to_lowercase();
    for phrase in BANNED_PHRASES {
        if lowered.contains(phrase) {
            violations.push(FormatViolation::BannedPhrase {
                phrase: phrase.to_string(),
            });
        }
    }

    if spec.forbid_contractions {
        for m in RE_CONTRACTION.find_iter(post) {
            violations.push(FormatViolation::Contraction {
                word: m.as_str().to_string(),
            });
        }
    }

    if !post.ends_with('?') {
        violations.push(FormatViolation::MissingClosingQuestion);
    }

    violations
}
