//! Tests for configuration loading from files and the environment.

use std::sync::{Mutex, OnceLock};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use azure_deploy::config::{ProviderSettings, DEFAULT_API_VERSION};
use azure_deploy::error::AzureError;
use azure_deploy::provider::{AzureOpenAiProvider, ModelProvider};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 4] = [
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_VERSION",
    "AZURE_OPENAI_DEPLOYMENTS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

const SETTINGS_TOML: &str = r#"
endpoint_url = "https://example.azure.com/"
default_api_version = "2024-10-21"

[deployments.o3]
deployment_name = "o3"
api_version = "2024-02-15"
fixed_temperature = 1.0

[deployments."gpt-4.1"]
deployment_name = "gpt-4-1"
streaming = false
context_window = 1047576
"#;

#[test]
fn load_reads_file_and_fills_key_from_env() {
    let _env_lock = env_lock_guard();
    let _env_guard = clear_env();
    std::env::set_var("AZURE_OPENAI_API_KEY", "env-key");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("azure.toml");
    std::fs::write(&path, SETTINGS_TOML).unwrap();

    let config = ProviderSettings::load(&path).unwrap().resolve().unwrap();

    assert_eq!(config.api_key(), "env-key");
    assert_eq!(config.endpoint_url(), "https://example.azure.com");
    assert_eq!(config.default_api_version(), "2024-10-21");

    let gpt = config.deployment("gpt-4.1").unwrap();
    assert_eq!(gpt.deployment_name, "gpt-4-1");
    assert_eq!(gpt.api_version, "2024-10-21");
    assert_eq!(gpt.context_window, 1_047_576);
    assert!(!gpt.streaming);

    let names: Vec<_> = config.deployments().map(|d| d.logical_name.as_str()).collect();
    assert_eq!(names, vec!["gpt-4.1", "o3"]);
}

#[test]
fn file_values_take_precedence_over_env() {
    let _env_lock = env_lock_guard();
    let _env_guard = clear_env();
    std::env::set_var("AZURE_OPENAI_ENDPOINT", "https://env.azure.com");
    std::env::set_var("AZURE_OPENAI_API_KEY", "env-key");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("azure.toml");
    std::fs::write(&path, format!("api_key = \"file-key\"\n{SETTINGS_TOML}")).unwrap();

    let config = ProviderSettings::load(&path).unwrap().resolve().unwrap();
    assert_eq!(config.api_key(), "file-key");
    assert_eq!(config.endpoint_url(), "https://example.azure.com");
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = ProviderSettings::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AzureError::Io(_)));
}

#[test]
fn invalid_toml_is_configuration_error() {
    let err = ProviderSettings::from_toml_str("endpoint_url = [").unwrap_err();
    assert!(matches!(err, AzureError::Configuration(_)));
}

#[test]
fn from_env_builds_deployments() {
    let _env_lock = env_lock_guard();
    let _env_guard = clear_env();
    std::env::set_var("AZURE_OPENAI_ENDPOINT", "https://env.azure.com");
    std::env::set_var("AZURE_OPENAI_API_KEY", "env-key");
    std::env::set_var("AZURE_OPENAI_DEPLOYMENTS", "gpt-4.1=gpt-4-1,o3");

    let provider = AzureOpenAiProvider::from_env().unwrap();

    assert!(provider.validate_model_name("gpt-4.1"));
    assert!(provider.validate_model_name("o3"));
    let gpt = provider.config().deployment("gpt-4.1").unwrap();
    assert_eq!(gpt.deployment_name, "gpt-4-1");
    assert_eq!(gpt.api_version, DEFAULT_API_VERSION);
}

#[test]
fn from_env_honours_api_version_override() {
    let _env_lock = env_lock_guard();
    let _env_guard = clear_env();
    std::env::set_var("AZURE_OPENAI_ENDPOINT", "https://env.azure.com");
    std::env::set_var("AZURE_OPENAI_API_KEY", "env-key");
    std::env::set_var("AZURE_OPENAI_API_VERSION", "2024-06-01");
    std::env::set_var("AZURE_OPENAI_DEPLOYMENTS", "gpt-4o");

    let config = ProviderSettings::from_env().unwrap().resolve().unwrap();
    assert_eq!(config.deployment("gpt-4o").unwrap().api_version, "2024-06-01");
}

#[test]
fn from_env_without_key_names_missing_variable() {
    let _env_lock = env_lock_guard();
    let _env_guard = clear_env();
    std::env::set_var("AZURE_OPENAI_ENDPOINT", "https://env.azure.com");

    let err = match AzureOpenAiProvider::from_env() {
        Ok(_) => panic!("expected missing key error"),
        Err(err) => err,
    };
    let text = err.to_string();
    assert!(text.contains("AZURE_OPENAI_API_KEY"), "unexpected error: {text}");
}
