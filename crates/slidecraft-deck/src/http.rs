//! HTTP image generation client
//!
//! Talks to an OpenAI-images-compatible endpoint: the prompt is POSTed as
//! JSON and the answer carries either base64 image data or a URL that is
//! downloaded with a second request.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::image::{
    ImagePrompt, ImageSource, DEFAULT_IMAGES_URL, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE,
    DEFAULT_TIMEOUT_SECS,
};

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Blocking client for an image generation service
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    /// Generation endpoint URL
    endpoint: String,
    /// Model name sent with each request
    model: String,
    /// Requested image size
    size: String,
    /// Bearer token, if the service needs one
    api_key: Option<String>,
    /// HTTP client
    client: Client,
    /// Request timeout
    timeout: Duration,
}

impl HttpImageSource {
    /// Create a client for the default endpoint
    pub fn new() -> Result<Self, ImageError> {
        Self::with_url(DEFAULT_IMAGES_URL)
    }

    /// Create a client for a custom endpoint
    pub fn with_url(endpoint: impl Into<String>) -> Result<Self, ImageError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
            api_key: None,
            client,
            timeout,
        })
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ImageError> {
        self.timeout = timeout;
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the requested image size (e.g. "1792x1024")
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let body = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            response_format: "b64_json",
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send()?)?;
        let parsed: GenerationResponse = response.json()?;
        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ImageError::InvalidResponse("no images in response".to_string()))?;

        decode_generated(image, |url| self.download(url))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = check_status(self.client.get(url).send()?)?;
        Ok(response.bytes()?.to_vec())
    }
}

impl ImageSource for HttpImageSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch(&self, prompt: &ImagePrompt) -> Result<Vec<u8>, ImageError> {
        self.generate(prompt.as_str())
    }
}

/// Turn a non-success status into a server error
fn check_status(response: Response) -> Result<Response, ImageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ImageError::ServerError {
        status: status.as_u16(),
        message,
    })
}

/// Extract image bytes, preferring inline base64 over a download URL
fn decode_generated<F>(image: GeneratedImage, download: F) -> Result<Vec<u8>, ImageError>
where
    F: FnOnce(&str) -> Result<Vec<u8>, ImageError>,
{
    match (image.b64_json, image.url) {
        (Some(b64), _) => STANDARD
            .decode(b64.trim())
            .map_err(|e| ImageError::InvalidResponse(format!("bad base64 image data: {e}"))),
        (None, Some(url)) => download(&url),
        (None, None) => Err(ImageError::InvalidResponse(
            "image entry has neither b64_json nor url".to_string(),
        )),
    }
}
