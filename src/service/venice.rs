//! HTTP client for the Venice text and image API.
//!
//! One [`VeniceClient`] serves both [`TextGenerator`] and [`ImageGenerator`].
//! The bearer credential is installed as a default header at construction
//! and never read again. There is no retry: a non-success status becomes
//! [`LinkpostError::Upstream`] carrying the status code.

use super::{
    ChatMessage, ChatRequest, ChatResponse, ImageGenerator, ImageRequest, ImageResponse,
    TextGenerator,
};
use crate::config::{GenerationConfig, ImageSettings, API_KEY_ENV};
use crate::error::{LinkpostError, Service};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Longest slice of an error body quoted back in an error message.
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for `/chat/completions` and `/image/generate`.
#[derive(Debug, Clone)]
pub struct VeniceClient {
    client: reqwest::Client,
    base_url: String,
    image: ImageSettings,
}

impl VeniceClient {
    /// Creates a client bound to `api_key`.
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        image: ImageSettings,
        timeout: Duration,
    ) -> Result<Self, LinkpostError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            LinkpostError::InvalidConfig(format!("invalid API key header value: {e}"))
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LinkpostError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            image,
        })
    }

    /// Creates a client from the credential and settings in `config`.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, LinkpostError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LinkpostError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            })?;
        Self::new(
            api_key,
            config.base_url.clone(),
            config.image.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn post_json<B, R>(&self, service: Service, path: &str, body: &B) -> Result<R, LinkpostError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LinkpostError::upstream(service, None, format!("request failed: {e}")))?;

        let status = response.status();
        debug!("{} {} → {} in {:?}", service, path, status, start.elapsed());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(LinkpostError::upstream(
                service,
                Some(status.as_u16()),
                if preview.is_empty() {
                    "empty error body".to_string()
                } else {
                    preview
                },
            ));
        }

        response.json::<R>().await.map_err(|e| {
            LinkpostError::upstream(
                service,
                Some(status.as_u16()),
                format!("invalid response body: {e}"),
            )
        })
    }
}

#[async_trait]
impl TextGenerator for VeniceClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LinkpostError> {
        let request = ChatRequest {
            model,
            messages,
            temperature,
        };
        let response: ChatResponse = self
            .post_json(Service::TextGeneration, "/chat/completions", &request)
            .await?;
        Ok(response.into_text())
    }
}

#[async_trait]
impl ImageGenerator for VeniceClient {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, LinkpostError> {
        let request = ImageRequest {
            model: &self.image.model,
            prompt,
            resolution: &self.image.resolution,
            aspect_ratio: &self.image.aspect_ratio,
            steps: self.image.steps,
            cfg_scale: self.image.cfg_scale,
            safe_mode: self.image.safe_mode,
        };
        self.post_json(Service::ImageGeneration, "/image/generate", &request)
            .await
    }
}
