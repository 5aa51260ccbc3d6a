//! Compatibility Oracle integration
//!
//! The oracle is an external vision-capable model that looks at both garment
//! images and answers with a JSON object `{score, reason}` embedded somewhere
//! in free-form text.
//!
//! # Layers
//! - **OracleTransport**: wire access (scoring request, image fetch, health check)
//! - **OracleAdapter**: image encoding, bounded wait, retries, tolerant parsing,
//!   and the rule-based fallback used on every failure
//! - **OutfitOracle**: the seam the suggestion generator depends on
//!
//! Failures never cross the adapter boundary. Callers learn whether the answer
//! came from the oracle or the fallback through `OracleAssessment::source`.

pub mod adapter;
pub mod fallback;
pub mod gemini_client;
pub mod json_extract;

pub use adapter::{AdapterSettings, OracleAdapter};
pub use fallback::rule_based_assessment;
pub use gemini_client::GeminiTransport;
pub use json_extract::{extract_json_object, parse_verdict, OracleVerdict};

use crate::models::ClothingItem;
use async_trait::async_trait;
use thiserror::Error;

/// Oracle errors
///
/// Internal to the adapter; every variant is answered with the rule-based
/// fallback before reaching a caller.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Oracle did not answer within {0} ms")]
    Timeout(u128),

    #[error("Oracle response contained no candidate text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid image reference: {0}")]
    InvalidImage(String),
}

impl OracleError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::Network(_) => true,
            OracleError::Api(status, _) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Where an assessment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentSource {
    /// Parsed from the oracle's answer
    Oracle,
    /// Rule-based estimate substituted after an oracle failure
    Fallback,
}

/// Normalized oracle answer
#[derive(Debug, Clone, PartialEq)]
pub struct OracleAssessment {
    /// Match score (0.0-1.0)
    pub match_score: f64,
    /// Short justification
    pub match_reason: String,
    pub source: AssessmentSource,
}

impl OracleAssessment {
    pub fn is_from_oracle(&self) -> bool {
        self.source == AssessmentSource::Oracle
    }
}

/// Base64 image ready for the oracle request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Standard base64 (no `data:` prefix)
    pub data: String,
}

/// Raw image downloaded from a remote URI
#[derive(Debug, Clone)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    /// Content type reported by the server, if any
    pub mime_type: Option<String>,
}

/// One scoring request
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// Fixed instruction prompt
    pub prompt: String,
    /// Top image first, bottom image second
    pub images: Vec<InlineImage>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Wire access to the oracle service
#[async_trait]
pub trait OracleTransport: Send + Sync {
    /// Send a scoring request; returns the first candidate's text
    async fn generate(&self, request: &OracleRequest) -> Result<String, OracleError>;

    /// Download an image referenced by a remote URI
    async fn fetch_image(&self, uri: &str) -> Result<ImageBytes, OracleError>;

    /// Cheap reachability/credential check without a scoring call
    async fn check_health(&self) -> Result<(), OracleError>;
}

/// Outfit scoring oracle as seen by the suggestion generator
#[async_trait]
pub trait OutfitOracle: Send + Sync {
    /// Score one top/bottom pair; never fails
    async fn assess(&self, top: &ClothingItem, bottom: &ClothingItem) -> OracleAssessment;

    /// Report upstream health without scoring anything
    async fn test_connection(&self) -> bool;
}
