//! Generic request → Azure chat-completion payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DeploymentConfig;
use crate::error::{AzureError, Result};
use crate::types::ChatMessage;

use super::GenerateRequest;

/// Pass-through option keys copied into the payload. Everything else is dropped.
pub const PASS_THROUGH_KEYS: [&str; 6] = [
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "seed",
    "stop",
    "stream",
];

/// One stop string or several.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StopSequences {
    One(String),
    Many(Vec<String>),
}

/// The allow-listed optional parameters, typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PassThroughOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl PassThroughOptions {
    /// Keep the allow-listed keys of `options` and type-check them.
    pub fn from_options(options: &Map<String, Value>) -> Result<Self> {
        let mut allowed = Map::new();
        for (key, value) in options {
            if PASS_THROUGH_KEYS.contains(&key.as_str()) {
                allowed.insert(key.clone(), value.clone());
            } else {
                debug!(option = %key, "dropping unsupported pass-through option");
            }
        }
        serde_json::from_value(Value::Object(allowed))
            .map_err(|e| AzureError::InvalidParameter(format!("invalid pass-through option: {e}")))
    }
}

/// Body of a chat-completion call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionPayload {
    /// Target deployment identifier.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub options: PassThroughOptions,
}

impl CompletionPayload {
    pub fn is_stream(&self) -> bool {
        self.options.stream.unwrap_or(false)
    }
}

/// Build the vendor payload for `request` against `deployment`.
///
/// `temperature` is the already-resolved value (fixed override applied and
/// validated by the caller). An explicit `stream` option wins over the
/// deployment's streaming flag.
pub fn build_payload(
    deployment: &DeploymentConfig,
    request: &GenerateRequest,
    temperature: f64,
) -> Result<CompletionPayload> {
    let mut options = PassThroughOptions::from_options(&request.options)?;
    options.stream = Some(options.stream.unwrap_or(deployment.streaming));

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(request.prompt.as_str()));

    Ok(CompletionPayload {
        model: deployment.deployment_name.clone(),
        messages,
        temperature,
        max_tokens: request.max_output_tokens.filter(|&n| n > 0),
        options,
    })
}
