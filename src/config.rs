//! Configuration types for a generation run.
//!
//! All pipeline behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. The API credential is carried here
//! explicitly and handed to the service-client constructors; nothing reads it
//! from process-wide state after startup.

use crate::error::LinkpostError;
use crate::progress::ProgressCallback;
use crate::service::{DocumentExtractor, ImageGenerator, PageScraper, TextGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "VENICE_API_KEY";
/// Optional override for the API base URL.
pub const BASE_URL_ENV: &str = "LINKPOST_BASE_URL";
/// Optional override for the default text model.
pub const MODEL_ENV: &str = "LINKPOST_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://api.venice.ai/api/v1";
pub const DEFAULT_TEXT_MODEL: &str = "kimi-k2-5";

/// Model id the web front-end sends when the user leaves the picker alone.
/// The API does not serve it, so it resolves to the default model.
const PLACEHOLDER_MODEL: &str = "gemini-3-flash-preview";

/// Fixed parameters sent with every image request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    pub model: String,
    pub resolution: String,
    pub aspect_ratio: String,
    pub steps: u32,
    pub cfg_scale: f32,
    pub safe_mode: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            model: "nano-banana-pro".into(),
            resolution: "2K".into(),
            aspect_ratio: "4:5".into(),
            steps: 1,
            cfg_scale: 7.5,
            safe_mode: true,
        }
    }
}

/// Configuration for a generation run.
///
/// # Example
/// ```rust
/// use linkpost::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .api_key("sk-test")
///     .batch_size(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.temperature, 0.4);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Bearer credential for the text and image API.
    pub api_key: Option<String>,

    /// API base URL. Default: `https://api.venice.ai/api/v1`.
    pub base_url: String,

    /// Text model used when the request names none. Default: `kimi-k2-5`.
    pub default_model: String,

    /// Sampling temperature for every text-generation call. Default: 0.4.
    pub temperature: f32,

    /// Image-generation parameters.
    pub image: ImageSettings,

    /// Image requests issued concurrently per batch. Default: 3.
    ///
    /// Batches run one after another; requests inside a batch run together.
    pub batch_size: usize,

    /// Transport timeout for API calls in seconds. Default: 300.
    pub request_timeout_secs: u64,

    /// Timeout for fetching a page to scrape, in seconds. Default: 30.
    pub scrape_timeout_secs: u64,

    /// Pre-constructed text generator. Takes precedence over the default client.
    pub text_generator: Option<Arc<dyn TextGenerator>>,

    /// Pre-constructed image generator. Takes precedence over the default client.
    pub image_generator: Option<Arc<dyn ImageGenerator>>,

    /// Pre-constructed page scraper.
    pub scraper: Option<Arc<dyn PageScraper>>,

    /// Pre-constructed document extractor.
    pub document_extractor: Option<Arc<dyn DocumentExtractor>>,

    /// Optional progress callback for stage and per-slide events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_TEXT_MODEL.to_string(),
            temperature: 0.4,
            image: ImageSettings::default(),
            batch_size: 3,
            request_timeout_secs: 300,
            scrape_timeout_secs: 30,
            text_generator: None,
            image_generator: None,
            scraper: None,
            document_extractor: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .field("image", &self.image)
            .field("batch_size", &self.batch_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("text_generator", &self.text_generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field("image_generator", &self.image_generator.as_ref().map(|_| "<dyn ImageGenerator>"))
            .field("scraper", &self.scraper.as_ref().map(|_| "<dyn PageScraper>"))
            .field(
                "document_extractor",
                &self.document_extractor.as_ref().map(|_| "<dyn DocumentExtractor>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// Builder pre-filled from `VENICE_API_KEY`, `LINKPOST_BASE_URL`, and `LINKPOST_MODEL`.
    pub fn from_env() -> GenerationConfigBuilder {
        let mut builder = Self::builder();
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(url) = non_empty_env(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        if let Some(model) = non_empty_env(MODEL_ENV) {
            builder = builder.default_model(model);
        }
        builder
    }

    /// Pick the text model for a request.
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(model) if !model.is_empty() && model != PLACEHOLDER_MODEL => model.to_string(),
            _ => self.default_model.clone(),
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn image_settings(mut self, settings: ImageSettings) -> Self {
        self.config.image = settings;
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn scrape_timeout_secs(mut self, secs: u64) -> Self {
        self.config.scrape_timeout_secs = secs;
        self
    }

    pub fn text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.text_generator = Some(generator);
        self
    }

    pub fn image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.config.image_generator = Some(generator);
        self
    }

    pub fn scraper(mut self, scraper: Arc<dyn PageScraper>) -> Self {
        self.config.scraper = Some(scraper);
        self
    }

    pub fn document_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.config.document_extractor = Some(extractor);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, LinkpostError> {
        let c = &self.config;
        if c.batch_size == 0 {
            return Err(LinkpostError::InvalidConfig("Batch size must be ≥ 1".into()));
        }
        if c.default_model.trim().is_empty() {
            return Err(LinkpostError::InvalidConfig(
                "Default text model must not be empty".into(),
            ));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(LinkpostError::InvalidConfig(format!(
                "Base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_api_contract() {
        let config = GenerationConfig::default();
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.temperature, 0.4);
        assert_eq!(config.image.model, "nano-banana-pro");
        assert_eq!(config.image.aspect_ratio, "4:5");
        assert_eq!(config.image.steps, 1);
        assert!(config.image.safe_mode);
    }

    #[test]
    fn builder_clamps_values() {
        let config = GenerationConfig::builder()
            .batch_size(0)
            .temperature(5.0)
            .base_url("https://example.test/api/")
            .build()
            .unwrap();
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.base_url, "https://example.test/api");
    }

    #[test]
    fn builder_rejects_non_http_base_url() {
        let err = GenerationConfig::builder().base_url("ftp://nope").build().unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GenerationConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn model_resolution() {
        let config = GenerationConfig::default();
        assert_eq!(config.resolve_model(None), "kimi-k2-5");
        assert_eq!(config.resolve_model(Some("  ")), "kimi-k2-5");
        assert_eq!(config.resolve_model(Some("gemini-3-flash-preview")), "kimi-k2-5");
        assert_eq!(config.resolve_model(Some("llama-3.3-70b")), "llama-3.3-70b");
    }
}
