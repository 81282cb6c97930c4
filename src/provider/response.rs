//! Azure chat-completion results → [`ModelResponse`].

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::{AzureError, Result};
use crate::models::{ProviderType, AZURE_FRIENDLY_NAME};
use crate::types::{ModelResponse, ResponseMetadata, Usage};

/// Aggregate (non-streamed) chat completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<CompletionUsage> for Usage {
    fn from(u: CompletionUsage) -> Self {
        Usage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens)
    }
}

/// One incremental unit of a streamed completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// A chunk carrying one content delta.
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: Some(text.into()),
                },
                finish_reason: None,
            }],
            ..Default::default()
        }
    }
}

/// Decode one streamed event.
///
/// Azure reports failures after the stream has started as an
/// `{"error": {"code": ..., "message": ...}}` event; that becomes a
/// [`AzureError::Stream`] instead of an empty chunk.
pub fn parse_chunk(data: &str) -> Result<ChatCompletionChunk> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        let message = match error.get("code").and_then(|c| c.as_str()) {
            Some(code) => format!("{code}: {message}"),
            None => message,
        };
        return Err(AzureError::Stream(message));
    }
    Ok(serde_json::from_value(value)?)
}

fn response_for(
    model_name: &str,
    content: String,
    usage: Option<Usage>,
    metadata: ResponseMetadata,
) -> ModelResponse {
    ModelResponse {
        content,
        usage,
        model_name: model_name.to_string(),
        friendly_name: AZURE_FRIENDLY_NAME.to_string(),
        provider: ProviderType::Azure,
        metadata,
    }
}

/// Normalize an aggregate completion. Reads the first choice only.
pub fn from_completion(completion: ChatCompletion, model_name: &str) -> Result<ModelResponse> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AzureError::api(200, "No choices in Azure OpenAI response"))?;

    let metadata = ResponseMetadata {
        finish_reason: choice.finish_reason,
        model: completion.model,
        id: completion.id,
        created: completion.created,
    };

    Ok(response_for(
        model_name,
        choice.message.content.unwrap_or_default(),
        completion.usage.map(Usage::from),
        metadata,
    ))
}

/// Folds streamed chunks into one response.
///
/// Content deltas are concatenated in arrival order; finish reason, model, id
/// and created keep the last non-empty value seen.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    metadata: ResponseMetadata,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: ChatCompletionChunk) {
        for choice in chunk.choices {
            if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                self.content.push_str(&text);
            }
            if let Some(reason) = choice.finish_reason.filter(|r| !r.is_empty()) {
                self.metadata.finish_reason = Some(reason);
            }
        }
        if let Some(model) = chunk.model.filter(|m| !m.is_empty()) {
            self.metadata.model = Some(model);
        }
        if let Some(id) = chunk.id.filter(|id| !id.is_empty()) {
            self.metadata.id = Some(id);
        }
        if let Some(created) = chunk.created.filter(|&c| c != 0) {
            self.metadata.created = Some(created);
        }
    }

    /// Finish the stream. Streams never report usage on this path.
    pub fn finish(self, model_name: &str) -> ModelResponse {
        response_for(model_name, self.content, None, self.metadata)
    }
}

/// Drain a chunk stream to completion and normalize it.
pub async fn collect_stream(
    mut stream: BoxStream<'static, Result<ChatCompletionChunk>>,
    model_name: &str,
) -> Result<ModelResponse> {
    let mut acc = StreamAccumulator::new();
    while let Some(chunk) = stream.next().await {
        acc.push(chunk?);
    }
    Ok(acc.finish(model_name))
}
