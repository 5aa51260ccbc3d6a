//! Oracle adapter
//!
//! Turns an `OracleTransport` into an `OutfitOracle`: encodes both garment
//! images, sends the fixed instruction prompt under a bounded wait, retries
//! transient failures, and parses the verdict. Any failure is logged and
//! answered with `rule_based_assessment`.

use super::{
    parse_verdict, rule_based_assessment, AssessmentSource, InlineImage, OracleAssessment,
    OracleError, OracleRequest, OracleTransport, OutfitOracle,
};
use crate::models::ClothingItem;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use closet_common::config::OracleConfig;
use std::time::Duration;
use tracing::{debug, warn};

/// Instruction sent with every scoring request
pub const PROMPT: &str = "Analyze these two clothing items (a top and a bottom) and evaluate how well they match together. Consider color coordination, style compatibility, and fashion sense. Provide a match score from 0 to 1 (where 1 is perfect match) and a brief explanation of why they do or don't match well. Format your response as JSON with two fields: 'score' (number between 0 and 1) and 'reason' (string explanation, keep it concise under 150 characters).";

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const RETRY_BACKOFF_MS: u64 = 250;

/// Adapter behavior knobs
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSettings {
    /// Bounded wait covering image encoding, all attempts and parsing
    pub timeout: Duration,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::from(&OracleConfig::default())
    }
}

impl From<&OracleConfig> for AdapterSettings {
    fn from(config: &OracleConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// `OutfitOracle` backed by a wire transport
pub struct OracleAdapter<T: OracleTransport> {
    transport: T,
    settings: AdapterSettings,
}

impl<T: OracleTransport> OracleAdapter<T> {
    /// Create new oracle adapter
    pub fn new(transport: T, settings: AdapterSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Convert an image reference into inline base64
    ///
    /// `data:` URIs are decoded locally; `http(s)` URIs are downloaded
    /// through the transport.
    async fn encode_image(&self, uri: &str) -> Result<InlineImage, OracleError> {
        let uri = uri.trim();

        if let Some(rest) = uri.strip_prefix("data:") {
            return parse_data_uri(rest);
        }

        if uri.starts_with("http://") || uri.starts_with("https://") {
            let image = self.transport.fetch_image(uri).await?;
            if image.bytes.is_empty() {
                return Err(OracleError::InvalidImage(format!("empty image at {}", uri)));
            }
            let mime_type = image
                .mime_type
                .filter(|m| m.starts_with("image/"))
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
            return Ok(InlineImage {
                mime_type,
                data: STANDARD.encode(&image.bytes),
            });
        }

        Err(OracleError::InvalidImage(format!(
            "unsupported image reference: {}",
            truncate_for_log(uri)
        )))
    }

    /// Send the request, retrying transient failures with linear backoff
    async fn generate_with_retry(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let mut attempt = 0u32;
        loop {
            match self.transport.generate(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    debug!(attempt, error = %e, "Retrying oracle request");
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_assess(
        &self,
        top: &ClothingItem,
        bottom: &ClothingItem,
    ) -> Result<OracleAssessment, OracleError> {
        let (top_image, bottom_image) = futures::try_join!(
            self.encode_image(&top.image_url),
            self.encode_image(&bottom.image_url)
        )?;

        let request = OracleRequest {
            prompt: PROMPT.to_string(),
            images: vec![top_image, bottom_image],
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        };

        let text = self.generate_with_retry(&request).await?;
        debug!(response = %text, "Oracle answered");

        let verdict = parse_verdict(&text)?;
        Ok(OracleAssessment {
            match_score: verdict.score,
            match_reason: verdict.reason,
            source: AssessmentSource::Oracle,
        })
    }
}

#[async_trait]
impl<T: OracleTransport> OutfitOracle for OracleAdapter<T> {
    async fn assess(&self, top: &ClothingItem, bottom: &ClothingItem) -> OracleAssessment {
        let outcome = match tokio::time::timeout(self.settings.timeout, self.try_assess(top, bottom))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.settings.timeout.as_millis())),
        };

        match outcome {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!(
                    top_id = %top.id,
                    bottom_id = %bottom.id,
                    error = %e,
                    "Oracle assessment failed, using rule-based estimate"
                );
                rule_based_assessment(top, bottom)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match tokio::time::timeout(self.settings.timeout, self.transport.check_health()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Oracle connection test failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.settings.timeout.as_millis() as u64,
                    "Oracle connection test timed out"
                );
                false
            }
        }
    }
}

/// Parse the part of a `data:` URI after the scheme
fn parse_data_uri(rest: &str) -> Result<InlineImage, OracleError> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| OracleError::InvalidImage("data URI without payload".to_string()))?;

    let mut params = meta.split(';');
    let mime_type = params
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        payload.trim().to_string()
    } else {
        STANDARD.encode(payload.as_bytes())
    };

    if data.is_empty() {
        return Err(OracleError::InvalidImage("empty data URI".to_string()));
    }

    Ok(InlineImage { mime_type, data })
}

fn truncate_for_log(uri: &str) -> String {
    uri.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Fabric, Style};
    use crate::oracle::ImageBytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Transport answering with a fixed outcome
    struct MockTransport {
        reply: Result<String, u16>,
        delay: Duration,
        generate_calls: Arc<AtomicUsize>,
        fetch_calls: Arc<AtomicUsize>,
        healthy: bool,
    }

    impl MockTransport {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                delay: Duration::ZERO,
                generate_calls: Arc::new(AtomicUsize::new(0)),
                fetch_calls: Arc::new(AtomicUsize::new(0)),
                healthy: true,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                ..Self::replying("")
            }
        }
    }

    #[async_trait]
    impl OracleTransport for MockTransport {
        async fn generate(&self, request: &OracleRequest) -> Result<String, OracleError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.images.len(), 2);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(OracleError::Api(*status, "boom".to_string())),
            }
        }

        async fn fetch_image(&self, _uri: &str) -> Result<ImageBytes, OracleError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ImageBytes {
                bytes: vec![0xff, 0xd8, 0xff],
                mime_type: Some("image/png".to_string()),
            })
        }

        async fn check_health(&self) -> Result<(), OracleError> {
            if self.healthy {
                Ok(())
            } else {
                Err(OracleError::Api(403, "forbidden".to_string()))
            }
        }
    }

    fn item(category: Category, image_url: &str) -> ClothingItem {
        ClothingItem {
            id: format!("{}-1", category.as_str()),
            category,
            image_url: image_url.to_string(),
            color: "#000000".to_string(),
            style: Style::Casual,
            fabric: Fabric::Cotton,
            added: chrono::Utc::now(),
            name: None,
        }
    }

    fn settings(max_retries: u32, timeout: Duration) -> AdapterSettings {
        AdapterSettings {
            timeout,
            max_retries,
            ..AdapterSettings::default()
        }
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed() {
        let transport =
            MockTransport::replying("```json\n{\"score\": 0.75, \"reason\": \"Crisp contrast\"}\n```");
        let adapter = OracleAdapter::new(transport, AdapterSettings::default());

        let top = item(Category::Top, "data:image/png;base64,iVBORw0KGgo=");
        let bottom = item(Category::Bottom, "data:image/jpeg;base64,/9j/4AAQ");
        let assessment = adapter.assess(&top, &bottom).await;

        assert!(assessment.is_from_oracle());
        assert!((assessment.match_score - 0.75).abs() < 1e-9);
        assert_eq!(assessment.match_reason, "Crisp contrast");
    }

    #[tokio::test]
    async fn test_remote_images_are_fetched() {
        let transport = MockTransport::replying(r#"{"score": 1, "reason": "ok"}"#);
        let fetches = Arc::clone(&transport.fetch_calls);
        let adapter = OracleAdapter::new(transport, AdapterSettings::default());

        let top = item(Category::Top, "https://img.example/top.png");
        let bottom = item(Category::Bottom, "data:image/jpeg;base64,/9j/4AAQ");
        assert!(adapter.assess(&top, &bottom).await.is_from_oracle());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let transport = MockTransport::failing(500);
        let calls = Arc::clone(&transport.generate_calls);
        let adapter = OracleAdapter::new(transport, AdapterSettings::default());

        let top = item(Category::Top, "data:image/png;base64,AAAA");
        let bottom = item(Category::Bottom, "data:image/png;base64,AAAA");
        let assessment = adapter.assess(&top, &bottom).await;

        assert_eq!(assessment.source, AssessmentSource::Fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let transport = MockTransport::failing(503);
        let calls = Arc::clone(&transport.generate_calls);
        let adapter = OracleAdapter::new(transport, settings(2, Duration::from_secs(5)));

        let top = item(Category::Top, "data:image/png;base64,AAAA");
        let bottom = item(Category::Bottom, "data:image/png;base64,AAAA");
        adapter.assess(&top, &bottom).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let transport = MockTransport::failing(400);
        let calls = Arc::clone(&transport.generate_calls);
        let adapter = OracleAdapter::new(transport, settings(2, Duration::from_secs(5)));

        let top = item(Category::Top, "data:image/png;base64,AAAA");
        let bottom = item(Category::Bottom, "data:image/png;base64,AAAA");
        adapter.assess(&top, &bottom).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_oracle_times_out_to_fallback() {
        let transport = MockTransport {
            delay: Duration::from_secs(10),
            ..MockTransport::replying(r#"{"score": 1, "reason": "late"}"#)
        };
        let adapter = OracleAdapter::new(transport, settings(0, Duration::from_millis(50)));

        let top = item(Category::Top, "data:image/png;base64,AAAA");
        let bottom = item(Category::Bottom, "data:image/png;base64,AAAA");
        let assessment = adapter.assess(&top, &bottom).await;

        assert_eq!(assessment.source, AssessmentSource::Fallback);
    }

    #[tokio::test]
    async fn test_unsupported_image_reference_never_calls_oracle() {
        let transport = MockTransport::replying(r#"{"score": 1, "reason": "x"}"#);
        let calls = Arc::clone(&transport.generate_calls);
        let adapter = OracleAdapter::new(transport, AdapterSettings::default());

        let top = item(Category::Top, "file:///tmp/top.jpg");
        let bottom = item(Category::Bottom, "data:image/png;base64,AAAA");
        let assessment = adapter.assess(&top, &bottom).await;

        assert_eq!(assessment.source, AssessmentSource::Fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connection_check() {
        let adapter = OracleAdapter::new(MockTransport::replying(""), AdapterSettings::default());
        assert!(adapter.test_connection().await);

        let unhealthy = MockTransport {
            healthy: false,
            ..MockTransport::replying("")
        };
        let adapter = OracleAdapter::new(unhealthy, AdapterSettings::default());
        assert!(!adapter.test_connection().await);
    }

    #[test]
    fn test_data_uri_parsing() {
        let image = parse_data_uri("image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "iVBORw0KGgo=");

        let image = parse_data_uri(";base64,AAAA").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");

        assert!(parse_data_uri("image/png;base64").is_err());
        assert!(parse_data_uri("image/png;base64,").is_err());
    }
}
