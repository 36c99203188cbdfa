//! Post composition and the other single-shot text steps.
//!
//! Each function issues exactly one text-generation request. Posts are
//! linted after the fact: violations travel with the text and are logged,
//! but the text itself is returned as the model wrote it.

use super::acquire::{truncate_chars, ContentBlock};
use super::llm::TextCall;
use super::postprocess::{lint_post, strip_code_fences, FormatViolation};
use crate::error::LinkpostError;
use crate::prompts;
use crate::style::{freeform_spec, structured_summary_spec, PostStyle, StyleSpec};
use tracing::{info, warn};

/// Article chars sent to the facts summary.
pub const FACTS_BUDGET: usize = 3000;
/// Content chars interpolated into a styled post request.
pub const POST_BUDGET: usize = 4000;
/// Article chars sent to the structured extraction.
pub const STRUCTURED_BUDGET: usize = 4000;

/// A finished post and the formatting rules it breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedPost {
    pub text: String,
    pub violations: Vec<FormatViolation>,
}

fn finish(label: &str, text: String, spec: &StyleSpec) -> ComposedPost {
    let text = text.trim().to_string();
    let violations = lint_post(&text, spec);
    for v in &violations {
        warn!("{} post ({}): {}", label, spec.key, v);
    }
    info!(
        "Composed {} post: {} chars, {} format warning(s)",
        spec.key,
        text.chars().count(),
        violations.len()
    );
    ComposedPost { text, violations }
}

/// Bullet list of the article's names, numbers, and findings.
pub async fn summarize_facts(call: &TextCall<'_>, content: &ContentBlock) -> Result<String, LinkpostError> {
    let summary = call
        .ask(
            "facts",
            prompts::FACTS_SUMMARY_SYSTEM_PROMPT,
            content.excerpt(FACTS_BUDGET),
        )
        .await?;
    Ok(summary.trim().to_string())
}

/// Write a post in `style` from `content`.
pub async fn compose_post(
    call: &TextCall<'_>,
    content: &str,
    style: PostStyle,
) -> Result<ComposedPost, LinkpostError> {
    let spec = style.spec();
    let system = prompts::styled_post_system(spec.system_prompt);
    let user = spec.user_message(truncate_chars(content, POST_BUDGET));
    let text = call.ask(spec.key, &system, &user).await?;
    Ok(finish("Styled", text, &spec))
}

/// JSON extraction of headline, companies, findings, and data points.
///
/// The reply is returned as text with any code fence removed; it is not
/// parsed, since the post step only needs to quote it back.
pub async fn extract_structured(
    call: &TextCall<'_>,
    content: &ContentBlock,
) -> Result<String, LinkpostError> {
    let user = prompts::structured_extraction_user(content.excerpt(STRUCTURED_BUDGET));
    let reply = call
        .ask("structured", prompts::STRUCTURED_EXTRACTION_SYSTEM_PROMPT, &user)
        .await?;
    let summary = strip_code_fences(&reply);
    if serde_json::from_str::<serde_json::Value>(&summary).is_err() {
        warn!("Structured extraction did not return valid JSON; passing it through as text");
    }
    Ok(summary)
}

/// Write a post from a structured summary using a narrative angle.
pub async fn compose_from_summary(
    call: &TextCall<'_>,
    summary: &str,
    angle: &str,
) -> Result<ComposedPost, LinkpostError> {
    let spec = structured_summary_spec();
    let user = prompts::yolo_post_user(summary, angle);
    let text = call.ask(spec.key, spec.system_prompt, &user).await?;
    Ok(finish("Narrative", text, &spec))
}

/// Write a post straight from the caller's prompt.
pub async fn compose_freeform(call: &TextCall<'_>, prompt: &str) -> Result<ComposedPost, LinkpostError> {
    let spec = freeform_spec();
    let text = call.ask(spec.key, spec.system_prompt, prompt).await?;
    Ok(finish("Freeform", text, &spec))
}

/// Rewrite one image prompt to match the brand style.
pub async fn improve_image_prompt(call: &TextCall<'_>, prompt: &str) -> Result<String, LinkpostError> {
    let reply = call
        .ask(
            "improve-prompt",
            &prompts::improve_prompt_system(),
            &prompts::improve_prompt_user(prompt),
        )
        .await?;
    Ok(reply.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ContentSource;
    use crate::service::{ChatMessage, TextGenerator};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: String,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl Canned {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn chat(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LinkpostError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn styled_post_truncates_and_labels_content() {
        let generator = Canned::new("Short post.");
        let call = TextCall::new(&generator, "m", 0.4);
        let content = "é".repeat(POST_BUDGET + 500);

        let post = compose_post(&call, &content, PostStyle::DeepAnalysis).await.unwrap();
        assert_eq!(post.text, "Short post.");
        assert!(post.violations.contains(&FormatViolation::MissingClosingQuestion));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let user = &seen[0][1].content;
        assert!(user.starts_with("TOPIC/ARTICLE: "));
        assert_eq!(user.chars().count(), "TOPIC/ARTICLE: ".len() + POST_BUDGET);
        assert!(seen[0][0].content.contains("No em dashes"));
    }

    #[tokio::test]
    async fn structured_extraction_strips_fences() {
        let generator = Canned::new("```json\n{\"headline\":\"Lilly\"}\n```");
        let call = TextCall::new(&generator, "m", 0.4);
        let content = ContentBlock::new("article", ContentSource::Text);

        let summary = extract_structured(&call, &content).await.unwrap();
        assert_eq!(summary, "{\"headline\":\"Lilly\"}");
    }

    #[tokio::test]
    async fn summary_post_quotes_angle() {
        let generator = Canned::new("Post?");
        let call = TextCall::new(&generator, "m", 0.4);

        compose_from_summary(&call, "{}", "The Reframe").await.unwrap();
        let seen = generator.seen.lock().unwrap();
        assert!(seen[0][1].content.contains("\"The Reframe\" style"));
        assert_eq!(seen[0][0].content, prompts::YOLO_POST_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn freeform_passes_prompt_through() {
        let generator = Canned::new("  It's a post?  ");
        let call = TextCall::new(&generator, "m", 0.4);

        let post = compose_freeform(&call, "Write about TuneLab").await.unwrap();
        assert_eq!(post.text, "It's a post?");
        assert!(post
            .violations
            .iter()
            .any(|v| matches!(v, FormatViolation::Contraction { .. })));
        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0][1].content, "Write about TuneLab");
    }

    #[tokio::test]
    async fn improve_prompt_wraps_input() {
        let generator = Canned::new(" better prompt \n");
        let call = TextCall::new(&generator, "m", 0.4);

        let improved = improve_image_prompt(&call, "a lab").await.unwrap();
        assert_eq!(improved, "better prompt");
        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0][1].content, "PROMPT TO IMPROVE: a lab");
    }
}
