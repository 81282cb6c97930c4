//! CLI command handlers.

use std::path::Path;

use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::{AzureOpenAiProvider, GenerateRequest, ModelProvider};

use super::GenerateArgs;

/// Build the provider from a settings file, or the environment when none is given.
pub fn load_provider(config: Option<&Path>) -> Result<AzureOpenAiProvider> {
    let settings = match config {
        Some(path) => ProviderSettings::load(path)?,
        None => ProviderSettings::from_env()?,
    };
    Ok(AzureOpenAiProvider::new(settings.resolve()?))
}

/// Handle `azure-deploy models`.
pub fn handle_models(provider: &AzureOpenAiProvider) {
    for d in provider.config().deployments() {
        let fixed = d
            .fixed_temperature
            .map(|t| format!(" temperature={t}"))
            .unwrap_or_default();
        println!(
            "{}\tdeployment={} api-version={} streaming={} context={}{}",
            d.logical_name, d.deployment_name, d.api_version, d.streaming, d.context_window, fixed
        );
    }
}

/// Handle `azure-deploy capabilities <model>`.
pub fn handle_capabilities(provider: &AzureOpenAiProvider, model: &str) -> Result<()> {
    let caps = provider.get_capabilities(model)?;
    println!("{}", serde_json::to_string_pretty(&caps)?);
    Ok(())
}

/// Handle `azure-deploy generate <model> <prompt>`.
pub async fn handle_generate(provider: &AzureOpenAiProvider, args: GenerateArgs) -> Result<()> {
    let request = build_request(args);
    let response = provider.generate_content(&request).await?;

    println!("{}", response.content);
    if let Some(usage) = response.usage {
        eprintln!(
            "[{} prompt + {} completion = {} tokens]",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
    Ok(())
}

fn build_request(args: GenerateArgs) -> GenerateRequest {
    let stream = args.stream_override();
    let mut request = GenerateRequest::builder()
        .prompt(args.prompt)
        .model_name(args.model)
        .maybe_system_prompt(args.system)
        .maybe_max_output_tokens(args.max_tokens)
        .build();
    if let Some(t) = args.temperature {
        request.temperature = t;
    }
    if let Some(stream) = stream {
        request = request.with_option("stream", serde_json::Value::Bool(stream));
    }
    request
}
