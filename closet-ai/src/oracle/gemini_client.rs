//! Gemini multimodal transport
//!
//! Sends both garment images plus the instruction prompt to a
//! `generateContent` endpoint and returns the first candidate's text.
//!
//! # API Reference
//! - Endpoint: `{endpoint}?key={api_key}` (POST, JSON body)
//! - Health: `{models_endpoint}?key={api_key}` (GET)
//! - Rate Limit: client-side quota from `OracleConfig::requests_per_minute`

use super::{ImageBytes, OracleError, OracleRequest, OracleTransport};
use async_trait::async_trait;
use closet_common::config::OracleConfig;
use governor::{Quota, RateLimiter};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

/// User-Agent header
const USER_AGENT: &str = "ClosetFusion-AI/0.1.0";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// HTTP transport for a Gemini-style multimodal endpoint
pub struct GeminiTransport {
    http_client: Client,
    endpoint: String,
    models_endpoint: String,
    api_key: Option<String>,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl GeminiTransport {
    /// Create a transport from resolved oracle configuration
    ///
    /// # Errors
    /// Returns `OracleError::Network` if the HTTP client cannot be built.
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| OracleError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            models_endpoint: config.models_endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }

    fn api_key(&self) -> Result<&str, OracleError> {
        self.api_key.as_deref().ok_or(OracleError::MissingApiKey)
    }

    fn body<'a>(request: &'a OracleRequest) -> GenerateContentRequest<'a> {
        let mut parts = vec![Part::Text {
            text: &request.prompt,
        }];
        parts.extend(request.images.iter().map(|image| Part::Image {
            inline_data: InlineData {
                mime_type: &image.mime_type,
                data: &image.data,
            },
        }));

        GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, OracleError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(OracleError::Api(status.as_u16(), body))
    }
}

#[async_trait]
impl OracleTransport for GeminiTransport {
    async fn generate(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let api_key = self.api_key()?;

        self.rate_limiter.until_ready().await;

        debug!(
            endpoint = %self.endpoint,
            images = request.images.len(),
            "Sending oracle scoring request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| OracleError::Network(format!("Oracle request failed: {}", e)))?;

        let response = Self::error_for_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(format!("Failed to parse oracle response: {}", e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(OracleError::EmptyResponse)
    }

    async fn fetch_image(&self, uri: &str) -> Result<ImageBytes, OracleError> {
        debug!(uri = %uri, "Fetching garment image");

        let response = self
            .http_client
            .get(uri)
            .send()
            .await
            .map_err(|e| OracleError::Network(format!("Image fetch failed: {}", e)))?;

        let response = Self::error_for_status(response).await?;

        let mime_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| OracleError::Network(format!("Image download failed: {}", e)))?;

        Ok(ImageBytes {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }

    async fn check_health(&self) -> Result<(), OracleError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .get(&self.models_endpoint)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| OracleError::Network(format!("Oracle health check failed: {}", e)))?;

        Self::error_for_status(response).await.map(|_| ())
    }
}
