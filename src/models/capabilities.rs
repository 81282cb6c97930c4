//! Model capabilities descriptor.

use serde::{Deserialize, Serialize};

use crate::config::DeploymentConfig;

use super::{ProviderType, TemperatureConstraint, AZURE_FRIENDLY_NAME};

/// Describes what a deployed model can do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    pub provider: ProviderType,
    pub model_name: String,
    pub friendly_name: String,
    pub context_window: u32,
    pub supports_extended_thinking: bool,
    pub supports_system_prompts: bool,
    pub supports_streaming: bool,
    pub supports_function_calling: bool,
    pub temperature_constraint: TemperatureConstraint,
}

impl ModelCapabilities {
    /// Capabilities of an Azure deployment, derived fresh from its config.
    pub fn for_deployment(deployment: &DeploymentConfig) -> Self {
        Self {
            provider: ProviderType::Azure,
            model_name: deployment.logical_name.clone(),
            friendly_name: AZURE_FRIENDLY_NAME.to_string(),
            context_window: deployment.context_window,
            supports_extended_thinking: deployment.supports_extended_thinking,
            supports_system_prompts: true,
            supports_streaming: deployment.streaming,
            supports_function_calling: true,
            temperature_constraint: deployment.temperature_constraint(),
        }
    }
}
