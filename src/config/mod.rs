//! Configuration system (layered: code > TOML file > env).
//!
//! [`ProviderSettings`] is the loose input shape: every per-deployment field is
//! optional and unknown keys are collected rather than rejected.
//! [`ProviderSettings::resolve`] applies defaults, validates, and produces the
//! immutable [`ProviderConfig`] a provider is built from.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AzureError, Result};
use crate::models::TemperatureConstraint;

/// API version used when neither the deployment nor the provider names one.
pub const DEFAULT_API_VERSION: &str = "2023-07-01-preview";
/// Context window assumed when a deployment does not declare one.
pub const DEFAULT_CONTEXT_WINDOW: u32 = 200_000;

const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
const ENV_DEPLOYMENTS: &str = "AZURE_OPENAI_DEPLOYMENTS";

/// One resolved Azure deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    /// Caller-facing model name.
    pub logical_name: String,
    /// Deployment identifier on the Azure resource.
    pub deployment_name: String,
    pub api_version: String,
    pub streaming: bool,
    pub context_window: u32,
    pub supports_extended_thinking: bool,
    /// Forces every call to this sampling temperature.
    pub fixed_temperature: Option<f64>,
}

impl DeploymentConfig {
    /// Temperature rule for this deployment.
    pub fn temperature_constraint(&self) -> TemperatureConstraint {
        match self.fixed_temperature {
            Some(value) => TemperatureConstraint::Fixed(value),
            None => TemperatureConstraint::default(),
        }
    }
}

/// Per-deployment input settings. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, bon::Builder)]
pub struct DeploymentSettings {
    #[builder(into)]
    pub deployment_name: Option<String>,
    #[builder(into)]
    pub api_version: Option<String>,
    pub streaming: Option<bool>,
    pub context_window: Option<u32>,
    pub supports_extended_thinking: Option<bool>,
    pub fixed_temperature: Option<f64>,
    /// Keys this crate does not understand; logged and dropped on resolve.
    #[serde(flatten)]
    #[builder(default)]
    pub unknown: BTreeMap<String, toml::Value>,
}

/// Provider-level input settings, as read from code, TOML, or the environment.
#[derive(Clone, Default, Deserialize)]
pub struct ProviderSettings {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
    pub default_api_version: Option<String>,
    #[serde(default)]
    pub deployments: BTreeMap<String, DeploymentSettings>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("default_api_version", &self.default_api_version)
            .field("deployments", &self.deployments)
            .finish()
    }
}

impl ProviderSettings {
    pub fn new(endpoint_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn default_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.default_api_version = Some(api_version.into());
        self
    }

    /// Add (or replace) a deployment under `logical_name`.
    pub fn deployment(
        mut self,
        logical_name: impl Into<String>,
        settings: DeploymentSettings,
    ) -> Self {
        self.deployments.insert(logical_name.into(), settings);
        self
    }

    /// Parse settings from a TOML document.
    ///
    /// ```
    /// use azure_deploy::config::ProviderSettings;
    ///
    /// let settings = ProviderSettings::from_toml_str(r#"
    ///     endpoint_url = "https://example.openai.azure.com"
    ///     api_key = "key"
    ///
    ///     [deployments.gpt-4o]
    ///     streaming = false
    /// "#).unwrap();
    /// let config = settings.resolve().unwrap();
    /// assert!(config.contains("gpt-4o"));
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source)
            .map_err(|e| AzureError::Configuration(format!("invalid TOML settings: {e}")))
    }

    /// Read settings from a TOML file, filling gaps from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&source)?.with_env_fallback())
    }

    /// Build settings from environment variables (loading `.env` if present).
    ///
    /// `AZURE_OPENAI_DEPLOYMENTS` is a comma-separated list of
    /// `logical[=deployment]` entries.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default().with_env_fallback();
        if let Ok(list) = std::env::var(ENV_DEPLOYMENTS) {
            for (logical, settings_entry) in parse_deployment_list(&list)? {
                settings.deployments.insert(logical, settings_entry);
            }
        }
        Ok(settings)
    }

    /// Fill endpoint, key, and default API version from the environment
    /// where they are not already set.
    pub fn with_env_fallback(mut self) -> Self {
        let _ = dotenvy::dotenv();
        if self.endpoint_url.is_none() {
            self.endpoint_url = std::env::var(ENV_ENDPOINT).ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var(ENV_API_KEY).ok();
        }
        if self.default_api_version.is_none() {
            self.default_api_version = std::env::var(ENV_API_VERSION).ok();
        }
        self
    }

    /// Apply defaults and validate into an immutable [`ProviderConfig`].
    pub fn resolve(self) -> Result<ProviderConfig> {
        for key in self.unknown.keys() {
            warn!(key = %key, "ignoring unknown provider setting");
        }

        let endpoint_url = self
            .endpoint_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AzureError::Configuration(format!("Missing {ENV_ENDPOINT}")))?;
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AzureError::Configuration(format!("Missing {ENV_API_KEY}")))?;
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(AzureError::Configuration(format!(
                "{ENV_API_KEY} contains characters that cannot be sent in an HTTP header"
            )));
        }
        let default_api_version = self
            .default_api_version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let mut deployments = BTreeMap::new();
        for (logical_name, settings) in self.deployments {
            let deployment = resolve_deployment(&logical_name, settings, &default_api_version)?;
            deployments.insert(logical_name, deployment);
        }

        Ok(ProviderConfig {
            endpoint_url,
            api_key,
            default_api_version,
            deployments,
        })
    }
}

fn resolve_deployment(
    logical_name: &str,
    settings: DeploymentSettings,
    default_api_version: &str,
) -> Result<DeploymentConfig> {
    for key in settings.unknown.keys() {
        warn!(deployment = %logical_name, key = %key, "ignoring unknown deployment setting");
    }

    let deployment_name = settings
        .deployment_name
        .unwrap_or_else(|| logical_name.to_string());
    if deployment_name.trim().is_empty() {
        return Err(AzureError::Configuration(format!(
            "deployment '{logical_name}' has an empty deployment_name"
        )));
    }

    let context_window = settings.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW);
    if context_window == 0 {
        return Err(AzureError::Configuration(format!(
            "deployment '{logical_name}' must have a positive context_window"
        )));
    }

    if let Some(t) = settings.fixed_temperature {
        if !t.is_finite() || t < 0.0 {
            return Err(AzureError::Configuration(format!(
                "deployment '{logical_name}' has invalid fixed_temperature {t}"
            )));
        }
    }

    let api_version = settings
        .api_version
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_api_version.to_string());

    Ok(DeploymentConfig {
        logical_name: logical_name.to_string(),
        deployment_name,
        api_version,
        streaming: settings.streaming.unwrap_or(true),
        context_window,
        supports_extended_thinking: settings.supports_extended_thinking.unwrap_or(false),
        fixed_temperature: settings.fixed_temperature,
    })
}

/// Parse a `logical[=deployment],...` list.
pub fn parse_deployment_list(list: &str) -> Result<Vec<(String, DeploymentSettings)>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (logical, deployment) = match entry.split_once('=') {
                Some((logical, deployment)) => (logical.trim(), Some(deployment.trim())),
                None => (entry, None),
            };
            if logical.is_empty() {
                return Err(AzureError::Configuration(format!(
                    "invalid deployment entry '{entry}' in {ENV_DEPLOYMENTS}"
                )));
            }
            let settings = DeploymentSettings {
                deployment_name: deployment.map(str::to_string),
                ..Default::default()
            };
            Ok((logical.to_string(), settings))
        })
        .collect()
}

/// Validated provider configuration. Immutable once built.
#[derive(Clone)]
pub struct ProviderConfig {
    endpoint_url: String,
    api_key: String,
    default_api_version: String,
    deployments: BTreeMap<String, DeploymentConfig>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &"..")
            .field("default_api_version", &self.default_api_version)
            .field("deployments", &self.deployments)
            .finish()
    }
}

impl ProviderConfig {
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn default_api_version(&self) -> &str {
        &self.default_api_version
    }

    /// Look up a deployment by logical name.
    pub fn deployment(&self, logical_name: &str) -> Option<&DeploymentConfig> {
        self.deployments.get(logical_name)
    }

    pub fn contains(&self, logical_name: &str) -> bool {
        self.deployments.contains_key(logical_name)
    }

    /// All deployments, ordered by logical name.
    pub fn deployments(&self) -> impl Iterator<Item = &DeploymentConfig> {
        self.deployments.values()
    }
}
