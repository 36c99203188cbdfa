//! Pipeline stages for turning an article into a post and a carousel.
//!
//! Each submodule implements one step and is testable on its own against
//! fake collaborators.
//!
//! ## Data Flow
//!
//! ```text
//! acquire ──▶ insights ──▶ compose ──▶ synthesize ──▶ render
//! (text/pdf/  (6 stats)    (post +     (6 prompts,    (batches
//!  url/topic)               lint)       fallback)      of 3)
//! ```
//!
//! 1. [`acquire`]    — pick the first content source that clears the mode's
//!    threshold; scraping and PDF extraction happen only here
//! 2. [`insights`]   — one request, parsed into at most six entries
//! 3. [`compose`]    — one request per post, linted but never rewritten
//! 4. [`synthesize`] — exactly six image prompts, templated when generation
//!    comes up short
//! 5. [`render`]     — concurrent image requests per batch, sequential
//!    batches, dropped slides recorded
//!
//! [`llm`] binds the text generator to a run, [`postprocess`] holds the list
//! parser and post lint, and [`encode`] decodes image payloads.

pub mod acquire;
pub mod compose;
pub mod encode;
pub mod insights;
pub mod llm;
pub mod postprocess;
pub mod render;
pub mod synthesize;
