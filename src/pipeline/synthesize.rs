//! Image-prompt synthesis: always exactly six prompts.
//!
//! The generated strategy asks the model for slide-specific prompts. If it
//! yields fewer usable lines than slides, the whole set is replaced by the
//! templated one; the two are never mixed.

use super::acquire::truncate_chars;
use super::llm::TextCall;
use super::postprocess::{parse_list_capped, ListMarkers};
use crate::error::LinkpostError;
use crate::output::ImagePrompt;
use crate::prompts::{self, palette_clause};
use tracing::{info, warn};

/// Article chars quoted inside the generated-prompt request.
pub const ARTICLE_EXCERPT_BUDGET: usize = 2000;
/// Label chars interpolated into the summary slide template.
pub const TOPIC_LABEL_BUDGET: usize = 200;

/// Carousel slides per run.
pub const SLIDE_COUNT: usize = 6;

/// How a prompt set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStrategy {
    Generated,
    Templated,
}

/// Six brand-styled prompts keyed by position: summary, top insight, second
/// insight, process, vision, call to action.
pub fn templated_prompts(label: &str, insights: &[String]) -> Vec<ImagePrompt> {
    let palette = palette_clause();
    let label = truncate_chars(label, TOPIC_LABEL_BUDGET);
    let top = insights.first().map(String::as_str).unwrap_or("key finding");
    let second = insights.get(1).map(String::as_str).unwrap_or("important insight");

    vec![
        format!(
            "Executive summary visualization for: {label}. {palette} Clean infographic style, sophisticated corporate design."
        ),
        format!("Data highlight showing: \"{top}\". {palette} Minimalist callout box with elegant typography."),
        format!("Key insight illustration: \"{second}\". {palette} Professional healthcare aesthetic."),
        format!("Process or workflow diagram for the main concept. {palette} Contemporary minimalist icons."),
        format!("Innovation abstract representing the future vision. {palette} Premium corporate style."),
        format!("Call to action slide encouraging engagement. {palette} Elegant centered design, no text."),
    ]
}

/// Ask the model for slide prompts. May return fewer than [`SLIDE_COUNT`].
///
/// `article` is quoted (truncated) when present; `insights_raw` is the
/// extractor's reply as written.
pub async fn generated_prompts(
    call: &TextCall<'_>,
    article: Option<&str>,
    insights_raw: &str,
) -> Result<Vec<ImagePrompt>, LinkpostError> {
    let article = article.map(|a| truncate_chars(a, ARTICLE_EXCERPT_BUDGET));
    let reply = call
        .ask(
            "image-prompts",
            &prompts::image_prompt_system(),
            &prompts::image_prompt_user(article, insights_raw, SLIDE_COUNT),
        )
        .await?;
    Ok(parse_list_capped(&reply, ListMarkers::Rich, SLIDE_COUNT))
}

/// Generated prompts when there are enough of them, the templated set otherwise.
///
/// `label` seeds the templated summary slide (facts summary or article text).
pub async fn synthesize_prompts(
    call: &TextCall<'_>,
    article: Option<&str>,
    insights: &[String],
    insights_raw: &str,
    label: &str,
) -> Result<(Vec<ImagePrompt>, PromptStrategy), LinkpostError> {
    let generated = generated_prompts(call, article, insights_raw).await?;
    Ok(select_prompts(generated, label, insights))
}

/// The fallback decision on its own, for callers that already hold generated prompts.
pub fn select_prompts(
    generated: Vec<ImagePrompt>,
    label: &str,
    insights: &[String],
) -> (Vec<ImagePrompt>, PromptStrategy) {
    if generated.len() >= SLIDE_COUNT {
        info!("Using {} generated image prompts", SLIDE_COUNT);
        let mut prompts = generated;
        prompts.truncate(SLIDE_COUNT);
        (prompts, PromptStrategy::Generated)
    } else {
        warn!(
            "Only {} usable generated prompt(s); falling back to templates",
            generated.len()
        );
        (templated_prompts(label, insights), PromptStrategy::Templated)
    }
}
