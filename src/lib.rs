//! # linkpost
//!
//! Turn an article (URL, pasted text, or PDF) into a LinkedIn post and a
//! six-slide carousel of brand-styled images.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Acquire     first source that clears the mode's threshold
//!  │                 (text → PDF → URL scrape → topic, or the prompt)
//!  ├─ 2. Insights    one text call, at most six marker-free entries
//!  ├─ 3. Compose     styled post, linted (never rewritten)
//!  ├─ 4. Synthesize  exactly six image prompts, templated on shortfall
//!  ├─ 5. Render      image calls in batches of three, order preserved
//!  └─ 6. Output      post + slides + dropped-slide record, optional ZIP
//! ```
//!
//! Six modes select a subset of these steps; see [`Mode`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkpost::{generate, GenerationConfig, GenerationRequest, Mode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from VENICE_API_KEY
//!     let config = GenerationConfig::from_env().build()?;
//!     let request = GenerationRequest::new(Mode::Custom)
//!         .with_url("https://example.com/ai-in-clinical-trials");
//!     let output = generate(&request, &config).await?;
//!     println!("{}", output.post);
//!     let zip = linkpost::package_slides(&output.image_payloads())?;
//!     std::fs::write("carousel.zip", zip)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `linkpost` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! linkpost = { version = "0.1", default-features = false }
//! ```
//!
//! ## Testing Without a Network
//!
//! Every outbound collaborator is a trait ([`TextGenerator`],
//! [`ImageGenerator`], [`PageScraper`], [`DocumentExtractor`]) and can be
//! injected through [`GenerationConfigBuilder`]. Injected collaborators
//! also remove the need for an API key.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod request;
pub mod service;
pub mod style;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use archive::{extract_archive, package_slides};
pub use config::{GenerationConfig, GenerationConfigBuilder, ImageSettings};
pub use error::{LinkpostError, Service, SlideError};
pub use generate::{extract_document_text, generate, generate_sync, generate_to_dir};
pub use output::{GeneratedImage, GenerationOutput, ImagePrompt, RenderStats};
pub use pipeline::postprocess::FormatViolation;
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use request::{ContentSource, GenerationRequest, Mode};
pub use service::{
    ChatMessage, DocumentExtractor, DocumentText, HttpScraper, ImageGenerator, ImageResponse,
    PageScraper, PdfiumExtractor, ScrapedPage, TextGenerator, VeniceClient,
};
pub use style::{PostStyle, StyleSpec};
