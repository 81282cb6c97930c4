//! Outbound chat-completion client for Azure OpenAI.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

use crate::error::AzureError;

use super::http::{
    api_key_headers, build_client, parse_sse_data, status_to_error, SseLineBuffer, DEFAULT_TIMEOUT,
};
use super::request::CompletionPayload;
use super::response::{parse_chunk, ChatCompletion, ChatCompletionChunk};

/// Result of a completion call: one aggregate response or a chunk stream.
pub enum Completion {
    Response(ChatCompletion),
    Stream(BoxStream<'static, Result<ChatCompletionChunk, AzureError>>),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response(r) => f.debug_tuple("Response").field(r).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A chat-completion client bound to one endpoint, credential, and API version.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// API version every request from this client is issued with.
    fn api_version(&self) -> &str;

    /// Issue one completion call. Streams when `payload.is_stream()`.
    async fn create_completion(
        &self,
        payload: &CompletionPayload,
    ) -> Result<Completion, AzureError>;
}

/// Constructs [`ChatClient`]s for the client cache.
pub trait ClientFactory: Send + Sync {
    fn create(
        &self,
        endpoint_url: &str,
        api_key: &str,
        api_version: &str,
    ) -> Result<Arc<dyn ChatClient>, AzureError>;
}

/// Default factory producing reqwest-backed [`AzureChatClient`]s.
#[derive(Debug, Clone)]
pub struct AzureClientFactory {
    timeout: Duration,
}

impl Default for AzureClientFactory {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AzureClientFactory {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ClientFactory for AzureClientFactory {
    fn create(
        &self,
        endpoint_url: &str,
        api_key: &str,
        api_version: &str,
    ) -> Result<Arc<dyn ChatClient>, AzureError> {
        let http = build_client(self.timeout)?;
        Ok(Arc::new(AzureChatClient {
            http,
            endpoint_url: endpoint_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_version: api_version.to_string(),
        }))
    }
}

/// Azure OpenAI REST client for a single API version.
pub struct AzureChatClient {
    http: reqwest::Client,
    endpoint_url: String,
    api_key: String,
    api_version: String,
}

impl AzureChatClient {
    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint_url, deployment
        )
    }
}

#[async_trait]
impl ChatClient for AzureChatClient {
    fn api_version(&self) -> &str {
        &self.api_version
    }

    async fn create_completion(
        &self,
        payload: &CompletionPayload,
    ) -> Result<Completion, AzureError> {
        let url = self.completions_url(&payload.model);
        let stream = payload.is_stream();

        debug!(
            deployment = %payload.model,
            api_version = %self.api_version,
            stream,
            "Azure create_completion"
        );

        let resp = self
            .http
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .headers(api_key_headers(&self.api_key))
            .json(payload)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        if !stream {
            let body = resp.text().await?;
            let data: ChatCompletion = serde_json::from_str(&body)?;
            return Ok(Completion::Response(data));
        }

        let byte_stream = resp.bytes_stream().fuse();

        let chunks = async_stream::stream! {
            let mut lines = SseLineBuffer::default();
            futures::pin_mut!(byte_stream);

            loop {
                let line = match lines.next_line() {
                    Some(line) => line,
                    None => match byte_stream.next().await {
                        Some(Ok(bytes)) => {
                            lines.push(&bytes);
                            continue;
                        }
                        Some(Err(e)) => {
                            yield Err(AzureError::Network(e));
                            break;
                        }
                        // A last event may arrive without its trailing newline.
                        None => match lines.finish() {
                            Some(line) => line,
                            None => break,
                        },
                    },
                };

                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };

                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                if let Some(data) = parse_sse_data(&line) {
                    match parse_chunk(data) {
                        Ok(chunk) => {
                            yield Ok(chunk);
                        }
                        Err(e) => {
                            debug!(error = %e, "Azure stream failed mid-response");
                            yield Err(e);
                            break;
                        }
                    }
                }
            }
        };

        Ok(Completion::Stream(Box::pin(chunks)))
    }
}
