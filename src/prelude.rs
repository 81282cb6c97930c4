//! Convenience re-exports for common use.

pub use crate::config::{DeploymentConfig, DeploymentSettings, ProviderConfig, ProviderSettings};
pub use crate::error::{AzureError, Result};
pub use crate::models::{ModelCapabilities, ProviderType, TemperatureConstraint};
pub use crate::provider::{AzureOpenAiProvider, GenerateRequest, ModelProvider};
pub use crate::types::{ModelResponse, ResponseMetadata, Usage};
