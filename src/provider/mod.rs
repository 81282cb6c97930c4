//! Model provider trait and the Azure OpenAI implementation.

pub mod azure;
pub mod cache;
pub mod client;
pub mod http;
pub mod request;
pub mod response;

pub use azure::AzureOpenAiProvider;
pub use cache::ClientCache;
pub use client::{AzureChatClient, AzureClientFactory, ChatClient, ClientFactory, Completion};

use async_trait::async_trait;
use bon::Builder;
use serde_json::{Map, Value};

use crate::error::AzureError;
use crate::models::{ModelCapabilities, ProviderType, DEFAULT_TEMPERATURE};
use crate::types::ModelResponse;

/// A generation request in provider-agnostic form.
///
/// `options` carries loosely-typed extras; each provider decides which keys
/// it honours.
#[derive(Debug, Clone, Builder)]
pub struct GenerateRequest {
    #[builder(into)]
    pub prompt: String,
    /// Logical model name.
    #[builder(into)]
    pub model_name: String,
    #[builder(into)]
    pub system_prompt: Option<String>,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
    pub max_output_tokens: Option<u32>,
    #[builder(default)]
    pub options: Map<String, Value>,
}

impl GenerateRequest {
    /// Request with default temperature and no extras.
    pub fn new(prompt: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self::builder().prompt(prompt).model_name(model_name).build()
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// Capabilities of a logical model. Fails for unknown names.
    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities, AzureError>;

    fn validate_model_name(&self, model_name: &str) -> bool;

    /// Whether the model supports extended thinking. False for unknown names.
    fn supports_thinking_mode(&self, model_name: &str) -> bool;

    /// Generate a complete response. Streamed results are buffered.
    async fn generate_content(
        &self,
        request: &GenerateRequest,
    ) -> Result<ModelResponse, AzureError>;
}
