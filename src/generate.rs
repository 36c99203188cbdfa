//! Top-level entry points and mode dispatch.
//!
//! [`generate`] runs one request end to end and returns everything it
//! produced. Fatal errors abort the run; dropped slides do not (see
//! [`RenderStats`](crate::output::RenderStats)).

use crate::archive::package_slides;
use crate::config::GenerationConfig;
use crate::error::{LinkpostError, Service};
use crate::output::{GeneratedImage, GenerationOutput, RenderStats};
use crate::pipeline::acquire::{acquire, ContentBlock};
use crate::pipeline::compose::{
    compose_freeform, compose_from_summary, compose_post, extract_structured, improve_image_prompt,
    summarize_facts,
};
use crate::pipeline::insights::{extract_insights, InsightKind};
use crate::pipeline::llm::TextCall;
use crate::pipeline::render::render_all;
use crate::pipeline::synthesize::{synthesize_prompts, SLIDE_COUNT};
use crate::progress::{ProgressCallback, Stage};
use crate::request::{GenerationRequest, Mode};
use crate::service::{
    DocumentExtractor, DocumentText, HttpScraper, ImageGenerator, PageScraper, PdfiumExtractor,
    TextGenerator, VeniceClient,
};
use crate::style::{pick_angle, PostStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// File written by [`generate_to_dir`] for the post text.
pub const POST_FILE: &str = "post.md";
/// File written by [`generate_to_dir`] for the rendered slides.
pub const CAROUSEL_FILE: &str = "carousel.zip";
/// File written by [`generate_to_dir`] for the image prompts, one per line.
pub const PROMPTS_FILE: &str = "image-prompts.txt";

/// Run one generation request.
///
/// # Errors
/// - Validation errors ([`LinkpostError::is_validation`]) before any
///   text or image request is sent.
/// - [`LinkpostError::MissingCredential`] when a default client is needed
///   and no API key is configured.
/// - [`LinkpostError::Upstream`] when any text request, the scrape, or the
///   single image of [`Mode::ImageOnly`] fails. Carousel slides never abort
///   the run.
///
/// # Example
/// ```rust,no_run
/// use linkpost::{generate, GenerationConfig, GenerationRequest, Mode};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GenerationConfig::from_env().build()?;
/// let request = GenerationRequest::new(Mode::Custom)
///     .with_url("https://example.com/ai-in-trials")
///     .with_style("breaking-signal");
/// let output = generate(&request, &config).await?;
/// println!("{}", output.post);
/// eprintln!("{}/{} slides", output.render.rendered, output.render.requested);
/// # Ok(())
/// # }
/// ```
pub async fn generate(
    request: &GenerationRequest,
    config: &GenerationConfig,
) -> Result<GenerationOutput, LinkpostError> {
    let total_start = Instant::now();
    let mode = request.mode;
    info!("Starting {} run", mode);

    // ── Step 1: Resolve collaborators (no I/O) ───────────────────────────
    let text_generator = if needs_text(mode) {
        Some(resolve_text_generator(config)?)
    } else {
        None
    };
    let image_generator = if needs_images(mode) {
        Some(resolve_image_generator(config)?)
    } else {
        None
    };
    let scraper = resolve_scraper(config)?;
    let extractor = resolve_extractor(config);

    // ── Step 2: Acquire content ──────────────────────────────────────────
    stage(config, Stage::Acquire);
    let content = acquire(request, scraper.as_ref(), extractor.as_ref()).await?;
    debug!("Content: {} chars from {}", content.len(), content.source());

    // ── Step 3: Mode-specific steps ──────────────────────────────────────
    let model = config.resolve_model(request.model.as_deref());
    let text = text_generator
        .as_deref()
        .map(|g| TextCall::new(g, &model, config.temperature));
    let images = image_generator.as_deref();

    let mut output = GenerationOutput::new(mode, text.map(|_| model.clone()));

    match (mode, text, images) {
        (Mode::Custom, Some(call), Some(images)) => {
            run_custom(&mut output, request, &content, &call, images, config).await?
        }
        (Mode::Yolo, Some(call), Some(images)) => {
            run_yolo(&mut output, request, &content, &call, images, config).await?
        }
        (Mode::ImagePrompts, Some(call), _) => {
            run_image_prompts(&mut output, &content, &call, config).await?
        }
        (Mode::PostOnly, Some(call), _) => {
            stage(config, Stage::Compose);
            let post = compose_freeform(&call, content.text()).await?;
            output.post = post.text;
            output.format_warnings = post.violations;
        }
        (Mode::ImproveImagePrompt, Some(call), _) => {
            stage(config, Stage::Compose);
            output.improved_prompt = Some(improve_image_prompt(&call, content.text()).await?);
        }
        (Mode::ImageOnly, _, Some(images)) => {
            run_image_only(&mut output, &content, images, config).await?
        }
        _ => {
            return Err(LinkpostError::Internal(format!(
                "collaborators for {mode} were not resolved"
            )))
        }
    }

    info!(
        "{} run finished in {:?}: {} post chars, {} insights, {}/{} images",
        mode,
        total_start.elapsed(),
        output.post.chars().count(),
        output.stats.len(),
        output.render.rendered,
        output.render.requested
    );
    Ok(output)
}

/// Facts summary, styled post, insights, prompts grounded in the article, carousel.
async fn run_custom(
    output: &mut GenerationOutput,
    request: &GenerationRequest,
    content: &ContentBlock,
    call: &TextCall<'_>,
    images: &dyn ImageGenerator,
    config: &GenerationConfig,
) -> Result<(), LinkpostError> {
    let style = PostStyle::from_key(request.style.as_deref());

    stage(config, Stage::Compose);
    let summary = summarize_facts(call, content).await?;
    let post = compose_post(call, content.text(), style).await?;

    stage(config, Stage::Insights);
    let insights = extract_insights(call, content, InsightKind::Stats, SLIDE_COUNT).await?;

    stage(config, Stage::Synthesize);
    let (prompts, strategy) = synthesize_prompts(
        call,
        Some(content.text()),
        &insights.items,
        &insights.raw,
        &summary,
    )
    .await?;
    debug!("Image prompts: {:?}", strategy);

    stage(config, Stage::Render);
    let (rendered, stats) =
        render_all(images, &prompts, config.batch_size, config.progress_callback.as_ref()).await;

    output.style = Some(style.key().to_string());
    output.post = post.text;
    output.format_warnings = post.violations;
    output.summary = Some(summary);
    output.stats = insights.items;
    output.image_prompts = prompts;
    output.images = rendered;
    output.render = stats;
    Ok(())
}

/// Structured extraction, narrative-angle post, insights, prompts from insights, carousel.
async fn run_yolo(
    output: &mut GenerationOutput,
    request: &GenerationRequest,
    content: &ContentBlock,
    call: &TextCall<'_>,
    images: &dyn ImageGenerator,
    config: &GenerationConfig,
) -> Result<(), LinkpostError> {
    let angle = pick_angle(request.angle.as_deref());

    stage(config, Stage::Compose);
    let structured = extract_structured(call, content).await?;
    let post = compose_from_summary(call, &structured, &angle).await?;

    stage(config, Stage::Insights);
    let insights = extract_insights(call, content, InsightKind::Stats, SLIDE_COUNT).await?;

    stage(config, Stage::Synthesize);
    let (prompts, strategy) =
        synthesize_prompts(call, None, &insights.items, &insights.raw, content.text()).await?;
    debug!("Image prompts: {:?}", strategy);

    stage(config, Stage::Render);
    let (rendered, stats) =
        render_all(images, &prompts, config.batch_size, config.progress_callback.as_ref()).await;

    output.angle = Some(angle);
    output.post = post.text;
    output.format_warnings = post.violations;
    output.summary = Some(structured);
    output.stats = insights.items;
    output.image_prompts = prompts;
    output.images = rendered;
    output.render = stats;
    Ok(())
}

/// Finding/implication insights and six prompts; nothing is rendered.
async fn run_image_prompts(
    output: &mut GenerationOutput,
    content: &ContentBlock,
    call: &TextCall<'_>,
    config: &GenerationConfig,
) -> Result<(), LinkpostError> {
    stage(config, Stage::Insights);
    let insights = extract_insights(call, content, InsightKind::Findings, SLIDE_COUNT).await?;

    stage(config, Stage::Synthesize);
    let (prompts, strategy) =
        synthesize_prompts(call, None, &insights.items, &insights.raw, content.text()).await?;
    debug!("Image prompts: {:?}", strategy);

    output.stats = insights.items;
    output.image_prompts = prompts;
    Ok(())
}

/// A single image from the caller's prompt. No payload is an error here.
async fn run_image_only(
    output: &mut GenerationOutput,
    content: &ContentBlock,
    images: &dyn ImageGenerator,
    config: &GenerationConfig,
) -> Result<(), LinkpostError> {
    stage(config, Stage::Render);
    let prompt = content.text().to_string();
    let progress: Option<&ProgressCallback> = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_slide_start(1, 1);
    }

    let data = images
        .generate_image(&prompt)
        .await?
        .first_image()
        .ok_or_else(|| {
            LinkpostError::upstream(Service::ImageGeneration, None, "response contained no image")
        })?;

    if let Some(cb) = progress {
        cb.on_slide_complete(1, 1);
        cb.on_render_complete(1, 1);
    }
    output.image_prompts = vec![prompt.clone()];
    output.images = vec![GeneratedImage {
        slide: 1,
        prompt,
        data,
    }];
    output.render = RenderStats {
        requested: 1,
        rendered: 1,
        dropped: Vec::new(),
    };
    Ok(())
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    request: &GenerationRequest,
    config: &GenerationConfig,
) -> Result<GenerationOutput, LinkpostError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| LinkpostError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(request, config))
}

/// Run a request and write its artifacts into `dir`.
///
/// Writes [`POST_FILE`] when a post was produced, [`CAROUSEL_FILE`] when at
/// least one slide rendered, and [`PROMPTS_FILE`] when image prompts (or an
/// improved prompt) were produced.
/// Each file is written to a temporary name and renamed into place.
pub async fn generate_to_dir(
    request: &GenerationRequest,
    dir: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, LinkpostError> {
    let output = generate(request, config).await?;
    let dir = dir.as_ref();

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| LinkpostError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    if !output.post.is_empty() {
        atomic_write(&dir.join(POST_FILE), output.post.as_bytes()).await?;
    }
    if !output.images.is_empty() {
        let zip = package_slides(&output.image_payloads())?;
        atomic_write(&dir.join(CAROUSEL_FILE), &zip).await?;
    }
    let prompts = match output.improved_prompt {
        Some(ref improved) => vec![improved.clone()],
        None => output.image_prompts.clone(),
    };
    if !prompts.is_empty() {
        let text = prompts.join("\n") + "\n";
        atomic_write(&dir.join(PROMPTS_FILE), text.as_bytes()).await?;
    }

    info!("Wrote artifacts to {}", dir.display());
    Ok(output)
}

/// Extract the text of a PDF without generating anything.
///
/// Does not require an API key.
pub async fn extract_document_text(
    bytes: &[u8],
    config: &GenerationConfig,
) -> Result<DocumentText, LinkpostError> {
    resolve_extractor(config).extract(bytes).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), LinkpostError> {
    let write_err = |e| LinkpostError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn stage(config: &GenerationConfig, stage: Stage) {
    info!("Stage: {}", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage(stage);
    }
}

fn needs_text(mode: Mode) -> bool {
    !matches!(mode, Mode::ImageOnly)
}

fn needs_images(mode: Mode) -> bool {
    mode.renders_carousel() || mode == Mode::ImageOnly
}

/// Pre-built generator from the config, else the Venice client.
fn resolve_text_generator(config: &GenerationConfig) -> Result<Arc<dyn TextGenerator>, LinkpostError> {
    if let Some(ref generator) = config.text_generator {
        return Ok(Arc::clone(generator));
    }
    Ok(Arc::new(VeniceClient::from_config(config)?))
}

fn resolve_image_generator(
    config: &GenerationConfig,
) -> Result<Arc<dyn ImageGenerator>, LinkpostError> {
    if let Some(ref generator) = config.image_generator {
        return Ok(Arc::clone(generator));
    }
    Ok(Arc::new(VeniceClient::from_config(config)?))
}

fn resolve_scraper(config: &GenerationConfig) -> Result<Arc<dyn PageScraper>, LinkpostError> {
    if let Some(ref scraper) = config.scraper {
        return Ok(Arc::clone(scraper));
    }
    Ok(Arc::new(HttpScraper::new(Duration::from_secs(
        config.scrape_timeout_secs,
    ))?))
}

fn resolve_extractor(config: &GenerationConfig) -> Arc<dyn DocumentExtractor> {
    match config.document_extractor {
        Some(ref extractor) => Arc::clone(extractor),
        None => Arc::new(PdfiumExtractor::new()),
    }
}
