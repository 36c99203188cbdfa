//! Progress-callback trait for stage and per-slide events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as a run moves through its stages and renders each slide.
//!
//! # Example
//!
//! ```rust
//! use linkpost::{GenerationProgressCallback, GenerationConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: Arc<AtomicUsize>,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_slide_complete(&self, slide: usize, total: usize) {
//!         let done = self.rendered.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("Slide {}/{} done ({} so far)", slide, total, done);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     rendered: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Coarse pipeline stages, reported in order. Not every mode visits every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Acquire,
    Insights,
    Compose,
    Synthesize,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Acquire => "acquiring content",
            Stage::Insights => "extracting insights",
            Stage::Compose => "composing post",
            Stage::Synthesize => "writing image prompts",
            Stage::Render => "rendering slides",
        };
        f.write_str(name)
    }
}

/// Called by the pipeline as it advances.
///
/// Slides inside one batch render concurrently, so `on_slide_*` may be
/// invoked from several tasks at once. All methods default to no-ops.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called when the pipeline enters a stage.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called just before the image request for a slide is sent.
    ///
    /// # Arguments
    /// * `slide` — 1-indexed slide number
    /// * `total` — slides requested
    fn on_slide_start(&self, slide: usize, total: usize) {
        let _ = (slide, total);
    }

    /// Called when a slide image arrives.
    fn on_slide_complete(&self, slide: usize, total: usize) {
        let _ = (slide, total);
    }

    /// Called when a slide is dropped. The run continues.
    fn on_slide_error(&self, slide: usize, total: usize, error: &str) {
        let _ = (slide, total, error);
    }

    /// Called once after every slide has been attempted.
    fn on_render_complete(&self, requested: usize, rendered: usize) {
        let _ = (requested, rendered);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
