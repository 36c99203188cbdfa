//! CLI binary for linkpost.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `GenerationRequest` plus `GenerationConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use linkpost::{
    extract_document_text, generate, generate_to_dir, package_slides, GenerationConfig,
    GenerationOutput, GenerationProgressCallback, GenerationRequest, Mode, PostStyle,
    ProgressCallback, Stage,
};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while text stages run, then a slide bar once rendering starts.
/// Slides in one batch complete out of order, so each gets its own log line.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-slide wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading content…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} slides  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_style(progress_style);
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_prefix("Rendering");
    }

    fn elapsed(&self, slide: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&slide))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: Stage) {
        let msg = match stage {
            Stage::Acquire => "Reading content…",
            Stage::Insights => "Extracting insights…",
            Stage::Compose => "Writing post…",
            Stage::Synthesize => "Drafting image prompts…",
            Stage::Render => "Rendering slides…",
        };
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(msg);
    }

    fn on_slide_start(&self, slide: usize, total: usize) {
        if self.bar.length().unwrap_or(0) != total as u64 {
            self.activate_bar(total);
        }
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(slide, Instant::now());
        }
    }

    fn on_slide_complete(&self, slide: usize, total: usize) {
        let secs = self.elapsed(slide);
        self.bar.println(format!(
            "  {} Slide {}/{}  {}",
            green("✓"),
            slide,
            total,
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_slide_error(&self, slide: usize, total: usize, error: &str) {
        let secs = self.elapsed(slide);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Slide {}/{}  {}  {}",
            red("✗"),
            slide,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_render_complete(&self, requested: usize, rendered: usize) {
        self.bar.finish_and_clear();
        let failed = requested.saturating_sub(rendered);
        if failed == 0 {
            eprintln!("{} {} slides rendered", green("✔"), bold(&rendered.to_string()));
        } else {
            eprintln!(
                "{} {}/{} slides rendered  ({} dropped)",
                if rendered == 0 { red("✘") } else { cyan("⚠") },
                bold(&rendered.to_string()),
                requested,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Post and carousel from an article URL
  linkpost --url https://example.com/ai-trial-recruitment -o out/

  # Pick a post style
  linkpost --url https://example.com/article --style breaking-signal -o out/

  # Structured extraction with a random narrative angle
  linkpost --mode yolo --text-file article.txt -o out/

  # From a PDF
  linkpost --pdf whitepaper.pdf -o out/

  # Image prompts only, printed to stdout
  linkpost --mode image-prompts --topic "AI in pharmacovigilance signal detection workflows"

  # Post straight from a prompt
  linkpost --mode post-only --prompt "Why medical affairs teams should pilot LLM copilots"

  # Carousel ZIP only, post on stdout
  linkpost --url https://example.com/article --zip carousel.zip

  # Full output as JSON (images as base64)
  linkpost --url https://example.com/article --json > run.json

  # Print the text of a PDF (no API key needed)
  linkpost --extract-only --pdf whitepaper.pdf

MODES:
  custom                 facts summary, styled post, 6 insights, 6 slides (default)
  yolo                   structured extraction, narrative-angle post, 6 slides
  image-prompts          6 insights and 6 image prompts, nothing rendered
  post-only              one post from --prompt
  improve-image-prompt   rewrite --prompt in the brand visual style
  image-only             one image from --prompt

STYLES (custom mode):
  summary-highlights (default), breaking-signal, insider-narrative,
  deep-analysis, community-discussion, future-signal

OUTPUT FILES (-o DIR):
  post.md             the post text
  carousel.zip        slide-1.png … slide-6.png (dropped slides are absent)
  image-prompts.txt   one prompt per line

ENVIRONMENT VARIABLES:
  VENICE_API_KEY          Venice API key
  LINKPOST_BASE_URL       Override the API base URL
  LINKPOST_MODEL          Override the default text model
  PDFIUM_LIB_PATH         Path to an existing libpdfium (skips auto-download)
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory

  PDFium (~30 MB) is downloaded on the first --pdf run and cached.
"#;

/// Turn an article into a LinkedIn post and an image carousel.
#[derive(Parser, Debug)]
#[command(
    name = "linkpost",
    version,
    about = "Turn an article URL, pasted text, or PDF into a LinkedIn post and image carousel",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Pipeline variant.
    #[arg(short, long, env = "LINKPOST_MODE", value_enum, default_value = "custom")]
    mode: ModeArg,

    /// Article URL to scrape.
    #[arg(long)]
    url: Option<String>,

    /// Article text. Use "-" to read stdin.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// File containing article text.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// PDF document to extract text from.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Free-form topic, used when no other source has enough content.
    #[arg(long)]
    topic: Option<String>,

    /// Instruction for post-only, improve-image-prompt, and image-only modes.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Post style for custom mode.
    #[arg(short, long, env = "LINKPOST_STYLE")]
    style: Option<String>,

    /// Narrative angle for yolo mode (random when omitted).
    #[arg(long)]
    angle: Option<String>,

    /// Text model id.
    #[arg(long)]
    model: Option<String>,

    /// Venice API key.
    #[arg(long, env = "VENICE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write post.md, carousel.zip, and image-prompts.txt into this directory.
    #[arg(short, long, env = "LINKPOST_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Also write the rendered slides as a ZIP to this path.
    #[arg(long)]
    zip: Option<PathBuf>,

    /// Output the full result as JSON instead of the post text.
    #[arg(long)]
    json: bool,

    /// Print the extracted text of --pdf and exit.
    #[arg(long, requires = "pdf")]
    extract_only: bool,

    /// Image requests in flight per batch.
    #[arg(long, env = "LINKPOST_BATCH_SIZE", default_value_t = 3)]
    batch_size: usize,

    /// Text temperature (0.0–2.0).
    #[arg(long, env = "LINKPOST_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Per-request timeout in seconds.
    #[arg(long, env = "LINKPOST_API_TIMEOUT", default_value_t = 300)]
    api_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "LINKPOST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LINKPOST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LINKPOST_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Custom,
    Yolo,
    ImagePrompts,
    PostOnly,
    ImproveImagePrompt,
    ImageOnly,
}

impl From<ModeArg> for Mode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Custom => Mode::Custom,
            ModeArg::Yolo => Mode::Yolo,
            ModeArg::ImagePrompts => Mode::ImagePrompts,
            ModeArg::PostOnly => Mode::PostOnly,
            ModeArg::ImproveImagePrompt => Mode::ImproveImagePrompt,
            ModeArg::ImageOnly => Mode::ImageOnly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── PDFium, only when a PDF was given ────────────────────────────────
    if cli.pdf.is_some() {
        ensure_pdf_engine(cli.quiet)?;
    }

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let path = cli.pdf.as_ref().context("--extract-only needs --pdf")?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = GenerationConfig::builder()
            .build()
            .context("Invalid configuration")?;
        let doc = extract_document_text(&bytes, &config)
            .await
            .context("Failed to extract PDF text")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&doc).context("Failed to serialise document")?
            );
        } else {
            if let Some(ref title) = doc.title {
                eprintln!("Title: {}", title);
            }
            eprintln!("Pages: {}", doc.page_count);
            println!("{}", doc.text);
        }
        return Ok(());
    }

    // ── Build request and config ─────────────────────────────────────────
    let request = build_request(&cli).await?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = match cli.out_dir {
        Some(ref dir) => generate_to_dir(&request, dir, &config)
            .await
            .context("Generation failed")?,
        None => generate(&request, &config)
            .await
            .context("Generation failed")?,
    };

    if let Some(ref path) = cli.zip {
        if output.images.is_empty() {
            tracing::warn!("No slides rendered; {} not written", path.display());
        } else {
            let zip = package_slides(&output.image_payloads()).context("Failed to build ZIP")?;
            tokio::fs::write(path, zip)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.out_dir.is_none() {
        print_output(&output).context("Failed to write to stdout")?;
    }

    if !cli.quiet {
        print_summary(&output, cli.out_dir.as_ref(), show_progress);
    }
    Ok(())
}

/// Download pdfium on first use, with a byte-count bar unless quiet.
fn ensure_pdf_engine(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }
    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.set_message("Connecting…");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to a `GenerationRequest`.
async fn build_request(cli: &Cli) -> Result<GenerationRequest> {
    let mut request = GenerationRequest::new(cli.mode.into());

    let text = match (cli.text.as_deref(), cli.text_file.as_ref()) {
        (Some("-"), _) => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            Some(buf)
        }
        (Some(t), _) => Some(t.to_string()),
        (None, Some(path)) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read text from {}", path.display()))?,
        ),
        (None, None) => None,
    };
    if let Some(text) = text {
        request = request.with_text(text);
    }

    if let Some(ref path) = cli.pdf {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        request = request.with_document(bytes);
    }
    if let Some(ref url) = cli.url {
        request = request.with_url(url.clone());
    }
    if let Some(ref topic) = cli.topic {
        request = request.with_topic(topic.clone());
    }
    if let Some(ref prompt) = cli.prompt {
        request = request.with_prompt(prompt.clone());
    }
    if let Some(ref style) = cli.style {
        let resolved = PostStyle::from_key(Some(style));
        if resolved.key() != style.trim() {
            tracing::warn!("Unknown style '{}', using {}", style, resolved.key());
        }
        request = request.with_style(resolved.key());
    }
    if let Some(ref angle) = cli.angle {
        request = request.with_angle(angle.clone());
    }
    if let Some(ref model) = cli.model {
        request = request.with_model(model.clone());
    }
    Ok(request)
}

/// Map CLI args to `GenerationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::from_env()
        .temperature(cli.temperature)
        .batch_size(cli.batch_size)
        .request_timeout_secs(cli.api_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Post (or the mode's primary text) on stdout.
fn print_output(output: &GenerationOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if let Some(ref improved) = output.improved_prompt {
        writeln!(handle, "{improved}")?;
        return Ok(());
    }
    if !output.post.is_empty() {
        handle.write_all(output.post.as_bytes())?;
        if !output.post.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
    }
    if output.post.is_empty() && !output.image_prompts.is_empty() {
        for (i, prompt) in output.image_prompts.iter().enumerate() {
            writeln!(handle, "{}. {}", i + 1, prompt)?;
        }
    }
    Ok(())
}

fn print_summary(output: &GenerationOutput, out_dir: Option<&PathBuf>, show_progress: bool) {
    for warning in &output.format_warnings {
        eprintln!("{} {}", cyan("⚠"), warning);
    }

    let render = &output.render;
    if render.requested > 0 && !show_progress {
        eprintln!("Rendered {}/{} slides", render.rendered, render.requested);
        for dropped in &render.dropped {
            eprintln!("  {}", dim(&dropped.to_string()));
        }
    }
    if output.mode == Mode::ImageOnly && out_dir.is_none() {
        eprintln!("{}", dim("image returned; use --json or -o to keep it"));
    }

    if let Some(dir) = out_dir {
        eprintln!(
            "{}  {}  →  {}",
            if render.is_complete() { green("✔") } else { cyan("⚠") },
            output.mode,
            bold(&dir.display().to_string()),
        );
    }
}
