//! Azure OpenAI provider with per-deployment configuration.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{DeploymentConfig, ProviderConfig, ProviderSettings};
use crate::error::{AzureError, Result};
use crate::models::{ModelCapabilities, ProviderType};
use crate::types::ModelResponse;

use super::cache::ClientCache;
use super::client::{AzureClientFactory, ChatClient, ClientFactory, Completion};
use super::{request, response, GenerateRequest, ModelProvider};

/// Azure OpenAI Service provider serving several deployments from one endpoint.
pub struct AzureOpenAiProvider {
    config: ProviderConfig,
    clients: ClientCache,
    factory: Arc<dyn ClientFactory>,
}

impl AzureOpenAiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_client_factory(config, Arc::new(AzureClientFactory::default()))
    }

    /// Use a custom client factory (alternate transports, tests).
    pub fn with_client_factory(config: ProviderConfig, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            config,
            clients: ClientCache::new(),
            factory,
        }
    }

    /// Build from `AZURE_OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ProviderSettings::from_env()?.resolve()?))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn client_cache(&self) -> &ClientCache {
        &self.clients
    }

    /// Look up the deployment behind a logical model name.
    pub fn resolve(&self, model_name: &str) -> Result<&DeploymentConfig> {
        self.config
            .deployment(model_name)
            .ok_or_else(|| AzureError::UnsupportedModel(model_name.to_string()))
    }

    /// Cached client for `api_version`, built on first use.
    pub fn get_client(&self, api_version: &str) -> Result<Arc<dyn ChatClient>> {
        self.clients.get_or_try_insert_with(api_version, || {
            self.factory
                .create(self.config.endpoint_url(), self.config.api_key(), api_version)
        })
    }

    async fn call(
        &self,
        deployment: &DeploymentConfig,
        payload: &request::CompletionPayload,
    ) -> Result<ModelResponse> {
        let model_name = deployment.logical_name.as_str();
        let client = self.get_client(&deployment.api_version)?;
        match client.create_completion(payload).await? {
            Completion::Response(completion) => response::from_completion(completion, model_name),
            Completion::Stream(chunks) => response::collect_stream(chunks, model_name).await,
        }
    }
}

#[async_trait]
impl ModelProvider for AzureOpenAiProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Azure
    }

    fn get_capabilities(&self, model_name: &str) -> Result<ModelCapabilities> {
        self.resolve(model_name).map(ModelCapabilities::for_deployment)
    }

    fn validate_model_name(&self, model_name: &str) -> bool {
        self.config.contains(model_name)
    }

    fn supports_thinking_mode(&self, model_name: &str) -> bool {
        self.config
            .deployment(model_name)
            .is_some_and(|d| d.supports_extended_thinking)
    }

    async fn generate_content(&self, request: &GenerateRequest) -> Result<ModelResponse> {
        let deployment = self.resolve(&request.model_name)?;

        // A fixed temperature replaces the caller's value outright.
        let temperature = deployment.fixed_temperature.unwrap_or(request.temperature);
        let constraint = deployment.temperature_constraint();
        if !constraint.validate(temperature) {
            return Err(AzureError::InvalidParameter(format!(
                "temperature {temperature} is not valid for model {} ({})",
                request.model_name,
                constraint.description()
            )));
        }

        let payload = request::build_payload(deployment, request, temperature)?;

        debug!(
            model = %request.model_name,
            deployment = %deployment.deployment_name,
            api_version = %deployment.api_version,
            stream = payload.is_stream(),
            "Azure generate_content"
        );

        self.call(deployment, &payload)
            .await
            .map_err(|e| AzureError::call_failed(&request.model_name, e))
    }
}
