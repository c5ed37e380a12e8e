//! Decomposition model seam
//!
//! The model is an external collaborator: it receives a request and returns
//! raw text that may or may not be a valid decomposition. Timeouts, retries
//! and cancellation are the client's concern.

use crate::error::ModelError;
use async_trait::async_trait;
use flowscope_model::Stage;
use serde::{Deserialize, Serialize};

/// A decomposition request as sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRequest {
    /// Prompt template version
    pub prompt_version: String,
    /// Model to call
    pub model_id: String,
    /// Process description as the user wrote it
    pub description: String,
    /// Structured stages, empty when none were given
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
    /// Team size, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<u32>,
    /// Previous decomposition as JSON, when re-analyzing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Token accounting reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt tokens
    pub input_tokens: u64,
    /// Completion tokens
    pub output_tokens: u64,
}

/// Raw model reply
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Untrusted text, expected to hold decomposition JSON
    pub text: String,
    /// Token accounting reported by the model
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// Response with zero token usage
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// Client for the decomposition model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one decomposition request
    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;
}
