//! Whole-pipeline tests against in-process collaborators.
//!
//! No network and no API key: every text, image, scrape, and PDF call goes
//! to a fake injected through `GenerationConfig::builder()`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use linkpost::prompts::{
    image_prompt_system, improve_prompt_system, FACTS_SUMMARY_SYSTEM_PROMPT,
    FINDINGS_SYSTEM_PROMPT, INSIGHTS_SYSTEM_PROMPT, STRUCTURED_EXTRACTION_SYSTEM_PROMPT,
};
use linkpost::{
    extract_archive, generate, generate_to_dir, ChatMessage, DocumentExtractor, DocumentText,
    GenerationConfig, GenerationRequest, ImageGenerator, ImageResponse, LinkpostError, Mode,
    PageScraper, ScrapedPage, Service, SlideError, TextGenerator,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Answers each text step by recognising its system prompt.
struct Router {
    post: String,
    insights: String,
    image_prompts: String,
    calls: AtomicUsize,
    steps: Mutex<Vec<&'static str>>,
}

impl Router {
    fn new(post: &str, insights: &str, image_prompts: &str) -> Arc<Self> {
        Arc::new(Self {
            post: post.to_string(),
            insights: insights.to_string(),
            image_prompts: image_prompts.to_string(),
            calls: AtomicUsize::new(0),
            steps: Mutex::new(Vec::new()),
        })
    }

    fn steps(&self) -> Vec<&'static str> {
        self.steps.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for Router {
    async fn chat(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> Result<String, LinkpostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = messages[0].content.as_str();
        let (step, reply) = if system == FACTS_SUMMARY_SYSTEM_PROMPT {
            ("facts", "- Lilly\n- 40 percent faster screening".to_string())
        } else if system == INSIGHTS_SYSTEM_PROMPT || system == FINDINGS_SYSTEM_PROMPT {
            ("insights", self.insights.clone())
        } else if system == STRUCTURED_EXTRACTION_SYSTEM_PROMPT {
            ("structured", "```json\n{\"headline\":\"Lilly trial AI\"}\n```".to_string())
        } else if system == image_prompt_system() {
            ("image-prompts", self.image_prompts.clone())
        } else if system == improve_prompt_system() {
            ("improve", "Navy and gold abstract molecules, no text".to_string())
        } else {
            ("post", self.post.clone())
        };
        self.steps.lock().unwrap().push(step);
        Ok(reply)
    }
}

/// Renders a small PNG per prompt; the prompt's second word names the slide.
#[derive(Default)]
struct Painter {
    fail_on: Option<&'static str>,
    calls: AtomicUsize,
}

fn png(shade: u8) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([shade, 42, 74])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

#[async_trait]
impl ImageGenerator for Painter {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, LinkpostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let letter = prompt.split_whitespace().nth(1).unwrap_or("?");
        if Some(letter) == self.fail_on {
            return Err(LinkpostError::Upstream {
                service: Service::ImageGeneration,
                status: Some(502),
                message: "HTTP 502: bad gateway".into(),
            });
        }
        Ok(ImageResponse {
            images: vec![STANDARD.encode(png(letter.as_bytes()[0]))],
        })
    }
}

#[derive(Default)]
struct CountingScraper {
    calls: AtomicUsize,
}

#[async_trait]
impl PageScraper for CountingScraper {
    async fn scrape(&self, _url: &str) -> Result<ScrapedPage, LinkpostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScrapedPage {
            title: "Scraped".into(),
            text: "s".repeat(300),
        })
    }
}

#[derive(Default)]
struct CountingExtractor {
    calls: AtomicUsize,
}

#[async_trait]
impl DocumentExtractor for CountingExtractor {
    async fn extract(&self, _bytes: &[u8]) -> Result<DocumentText, LinkpostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DocumentText::default())
    }
}

struct Harness {
    text: Arc<Router>,
    images: Arc<Painter>,
    scraper: Arc<CountingScraper>,
    extractor: Arc<CountingExtractor>,
    config: GenerationConfig,
}

impl Harness {
    fn new(text: Arc<Router>, images: Painter) -> Self {
        let images = Arc::new(images);
        let scraper = Arc::new(CountingScraper::default());
        let extractor = Arc::new(CountingExtractor::default());
        let config = GenerationConfig::builder()
            .text_generator(text.clone())
            .image_generator(images.clone())
            .scraper(scraper.clone())
            .document_extractor(extractor.clone())
            .build()
            .unwrap();
        Self {
            text,
            images,
            scraper,
            extractor,
            config,
        }
    }

    fn upstream_calls(&self) -> usize {
        self.text.calls.load(Ordering::SeqCst)
            + self.images.calls.load(Ordering::SeqCst)
            + self.scraper.calls.load(Ordering::SeqCst)
            + self.extractor.calls.load(Ordering::SeqCst)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn article() -> String {
    let sentence = "Eli Lilly reported that an AI screening assistant matched patients to oncology \
trials 40 percent faster across 12 sites. ";
    let text = sentence.repeat(5);
    assert!(text.chars().count() >= 500);
    text
}

/// A summary-highlights post that clears every lint rule.
fn compliant_post() -> String {
    let body = "The team used a language model to read eligibility criteria and match them \
against structured records. "
        .repeat(12);
    format!(
        "Lilly just cut trial screening time by 40 percent.\n\n{}\n\nWhat would your team automate first?",
        body.trim()
    )
}

/// Seven insight lines, each with a "3. "-style marker.
fn seven_insights() -> String {
    (1..=7)
        .map(|i| format!("3. Insight number {i} about screening"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn six_prompts() -> String {
    ["A", "B", "C", "D", "E", "F"]
        .iter()
        .enumerate()
        .map(|(i, l)| format!("{}. Slide {l} abstract navy molecules", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn insufficient_content_issues_no_upstream_calls() {
    let h = Harness::new(Router::new("", "", ""), Painter::default());
    let request = GenerationRequest::new(Mode::Custom)
        .with_text("too short")
        .with_topic("AI");

    let err = tokio_test::block_on(generate(&request, &h.config)).unwrap_err();
    assert_eq!(err.code(), "insufficient_content");
    assert!(err.is_validation());
    assert_eq!(h.upstream_calls(), 0);
}

#[tokio::test]
async fn prompt_modes_without_prompt_fail_before_any_call() {
    let h = Harness::new(Router::new("", "", ""), Painter::default());
    for mode in [Mode::PostOnly, Mode::ImproveImagePrompt, Mode::ImageOnly] {
        let request = GenerationRequest::new(mode).with_text(article());
        let err = generate(&request, &h.config).await.unwrap_err();
        assert_eq!(err.code(), "missing_prompt", "{mode}");
    }
    assert_eq!(h.upstream_calls(), 0);
}

#[tokio::test]
async fn custom_run_drops_failed_slide_and_keeps_order() {
    let h = Harness::new(
        Router::new(&compliant_post(), &seven_insights(), &six_prompts()),
        Painter {
            fail_on: Some("C"),
            ..Default::default()
        },
    );
    let request = GenerationRequest::new(Mode::Custom)
        .with_text(article())
        .with_style("summary-highlights");

    let output = generate(&request, &h.config).await.unwrap();

    // Post
    let chars = output.post.chars().count();
    assert!(chars <= 1500, "post is {chars} chars");
    assert!(!output.post.contains('\u{2014}'));
    assert!(output.post.ends_with('?'));
    assert!(output.format_warnings.is_empty(), "{:?}", output.format_warnings);
    assert_eq!(output.style.as_deref(), Some("summary-highlights"));

    // Insights: seven marked lines become six clean ones
    assert_eq!(output.stats.len(), 6);
    for stat in &output.stats {
        assert!(stat.starts_with("Insight number"), "{stat}");
    }

    // Prompts and slides
    assert_eq!(output.image_prompts.len(), 6);
    let slides: Vec<usize> = output.images.iter().map(|i| i.slide).collect();
    assert_eq!(slides, vec![1, 2, 4, 5, 6]);
    let shades: Vec<Vec<u8>> = output.images.iter().map(|i| i.bytes().unwrap()).collect();
    let expected: Vec<Vec<u8>> = [b'A', b'B', b'D', b'E', b'F'].iter().map(|s| png(*s)).collect();
    assert_eq!(shades, expected);

    assert_eq!(output.render.requested, 6);
    assert_eq!(output.render.rendered, 5);
    assert!(matches!(
        output.render.dropped.as_slice(),
        [SlideError::RequestFailed { slide: 3, .. }]
    ));
    assert!(output.is_partial());

    assert_eq!(
        h.text.steps(),
        vec!["facts", "post", "insights", "image-prompts"]
    );
    assert_eq!(h.images.calls.load(Ordering::SeqCst), 6);
    assert_eq!(h.scraper.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lint_reports_without_rewriting() {
    let sloppy = "This is a game-changer \u{2014} it's huge. #pharma";
    let h = Harness::new(
        Router::new(sloppy, &seven_insights(), &six_prompts()),
        Painter::default(),
    );
    let request = GenerationRequest::new(Mode::Custom).with_text(article());

    let output = generate(&request, &h.config).await.unwrap();
    assert_eq!(output.post, sloppy);
    let rules: Vec<String> = output.format_warnings.iter().map(|v| v.to_string()).collect();
    assert!(rules.iter().any(|r| r.contains("em dash")), "{rules:?}");
    assert!(rules.iter().any(|r| r.contains("#pharma")), "{rules:?}");
    assert!(rules.iter().any(|r| r.contains("game-changer")), "{rules:?}");
    assert!(rules.iter().any(|r| r.contains("question")), "{rules:?}");
    // One post request: lint never triggers a retry
    assert_eq!(h.text.steps().iter().filter(|s| **s == "post").count(), 1);
}

#[tokio::test]
async fn malformed_prompt_reply_falls_back_to_six_templates() {
    let h = Harness::new(
        Router::new(&compliant_post(), &seven_insights(), "Sure! Here you go:\n\n***"),
        Painter::default(),
    );
    let request = GenerationRequest::new(Mode::Yolo)
        .with_text(article())
        .with_angle("the contrarian take");

    let output = generate(&request, &h.config).await.unwrap();
    assert_eq!(output.image_prompts.len(), 6);
    assert!(output.image_prompts[1].contains("Insight number 1"));
    assert!(output.image_prompts[2].contains("Insight number 2"));
    assert_eq!(output.angle.as_deref(), Some("the contrarian take"));
    assert_eq!(output.summary.as_deref(), Some("{\"headline\":\"Lilly trial AI\"}"));
    assert_eq!(output.images.len(), 6);
    assert!(output.render.is_complete());
    assert_eq!(
        h.text.steps(),
        vec!["structured", "post", "insights", "image-prompts"]
    );
}

#[tokio::test]
async fn image_prompts_mode_renders_nothing() {
    let h = Harness::new(
        Router::new("", &seven_insights(), &six_prompts()),
        Painter::default(),
    );
    let request = GenerationRequest::new(Mode::ImagePrompts).with_text(article());

    let output = generate(&request, &h.config).await.unwrap();
    assert_eq!(output.stats.len(), 6);
    assert_eq!(output.image_prompts.len(), 6);
    assert!(output.images.is_empty());
    assert!(output.post.is_empty());
    assert_eq!(h.images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn url_is_scraped_when_text_is_short() {
    let h = Harness::new(
        Router::new(&compliant_post(), &seven_insights(), &six_prompts()),
        Painter::default(),
    );
    let request = GenerationRequest::new(Mode::ImagePrompts)
        .with_text("short")
        .with_url("https://example.com/article");

    generate(&request, &h.config).await.unwrap();
    assert_eq!(h.scraper.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn prompt_modes_use_one_call_each() {
    let prompt = "Write about AI copilots for medical affairs teams";

    let h = Harness::new(
        Router::new(&compliant_post(), "", ""),
        Painter::default(),
    );
    let post = generate(&GenerationRequest::new(Mode::PostOnly).with_prompt(prompt), &h.config)
        .await
        .unwrap();
    assert_eq!(post.post, compliant_post());

    let improved = generate(
        &GenerationRequest::new(Mode::ImproveImagePrompt).with_prompt(prompt),
        &h.config,
    )
    .await
    .unwrap();
    assert_eq!(
        improved.improved_prompt.as_deref(),
        Some("Navy and gold abstract molecules, no text")
    );
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 2);

    let single = generate(
        &GenerationRequest::new(Mode::ImageOnly).with_prompt("A Slide of abstract navy shapes"),
        &h.config,
    )
    .await
    .unwrap();
    assert_eq!(single.images.len(), 1);
    assert_eq!(h.images.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn image_only_without_payload_is_an_error() {
    struct Blank;
    #[async_trait]
    impl ImageGenerator for Blank {
        async fn generate_image(&self, _prompt: &str) -> Result<ImageResponse, LinkpostError> {
            Ok(ImageResponse::default())
        }
    }

    let config = GenerationConfig::builder()
        .image_generator(Arc::new(Blank))
        .build()
        .unwrap();
    let request = GenerationRequest::new(Mode::ImageOnly).with_prompt("abstract navy molecules, no text");
    let err = generate(&request, &config).await.unwrap_err();
    assert_eq!(err.code(), "upstream_error");
}

#[tokio::test]
async fn generate_to_dir_writes_artifacts() {
    let h = Harness::new(
        Router::new(&compliant_post(), &seven_insights(), &six_prompts()),
        Painter {
            fail_on: Some("C"),
            ..Default::default()
        },
    );
    let dir = tempfile::tempdir().unwrap();
    let request = GenerationRequest::new(Mode::Custom).with_text(article());

    let output = generate_to_dir(&request, dir.path(), &h.config).await.unwrap();

    let post = std::fs::read_to_string(dir.path().join("post.md")).unwrap();
    assert_eq!(post, output.post);

    let prompts = std::fs::read_to_string(dir.path().join("image-prompts.txt")).unwrap();
    assert_eq!(prompts.lines().count(), 6);

    let zip = std::fs::read(dir.path().join("carousel.zip")).unwrap();
    let entries = extract_archive(&zip).unwrap();
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["slide-1.png", "slide-2.png", "slide-3.png", "slide-4.png", "slide-5.png"]
    );
    for ((_, bytes), image) in entries.iter().zip(&output.images) {
        assert_eq!(bytes, &image.bytes().unwrap());
    }

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
