//! Provider-agnostic generation result.

use serde::{Deserialize, Serialize};

use crate::models::ProviderType;

use super::Usage;

/// Vendor details carried alongside the generated text.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub finish_reason: Option<String>,
    /// Model name reported by the vendor (may differ from the logical name).
    pub model: Option<String>,
    pub id: Option<String>,
    pub created: Option<i64>,
}

/// Result of one `generate_content` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelResponse {
    pub content: String,
    /// `None` when the vendor reports no token counts (always for streams).
    pub usage: Option<Usage>,
    pub model_name: String,
    pub friendly_name: String,
    pub provider: ProviderType,
    pub metadata: ResponseMetadata,
}

impl ModelResponse {
    /// Total tokens used, or zero when usage is unknown.
    pub fn total_tokens(&self) -> u32 {
        self.usage.map(|u| u.total_tokens).unwrap_or(0)
    }
}
