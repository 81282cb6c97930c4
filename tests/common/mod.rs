//! Shared test helpers: fake Azure clients and a counting client factory.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use azure_deploy::config::{DeploymentSettings, ProviderConfig, ProviderSettings};
use azure_deploy::error::AzureError;
use azure_deploy::provider::request::CompletionPayload;
use azure_deploy::provider::response::{
    ChatCompletion, ChatCompletionChunk, ChunkChoice, ChunkDelta, CompletionChoice,
    CompletionMessage, CompletionUsage,
};
use azure_deploy::provider::{AzureOpenAiProvider, ChatClient, ClientFactory, Completion};

pub const ENDPOINT: &str = "https://example.azure.com";

/// The deployment set most tests run against.
pub fn test_config() -> ProviderConfig {
    ProviderSettings::new(ENDPOINT, "k")
        .deployment(
            "o3",
            DeploymentSettings::builder()
                .deployment_name("o3")
                .streaming(true)
                .api_version("2024-02-15")
                .fixed_temperature(1.0)
                .build(),
        )
        .deployment(
            "gpt-4.1",
            DeploymentSettings::builder()
                .deployment_name("gpt-4-1")
                .streaming(false)
                .build(),
        )
        .deployment(
            "o3-mini",
            DeploymentSettings::builder()
                .api_version("2024-02-15")
                .streaming(false)
                .supports_extended_thinking(true)
                .context_window(128_000)
                .build(),
        )
        .resolve()
        .expect("test config resolves")
}

/// `{content: "ok", finish_reason: "stop"}`, model `gpt`, id `1`, created `0`.
pub fn ok_completion() -> ChatCompletion {
    ChatCompletion {
        id: Some("1".into()),
        model: Some("gpt".into()),
        created: Some(0),
        choices: vec![CompletionChoice {
            message: CompletionMessage {
                content: Some("ok".into()),
            },
            finish_reason: Some("stop".into()),
        }],
        usage: Some(CompletionUsage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
        }),
    }
}

/// `"He"`, `"llo"`, then a chunk finishing with `stop`.
pub fn hello_chunks() -> Vec<ChatCompletionChunk> {
    vec![
        ChatCompletionChunk {
            id: Some("s-1".into()),
            model: Some("o3".into()),
            created: Some(42),
            ..ChatCompletionChunk::delta("He")
        },
        ChatCompletionChunk::delta("llo"),
        ChatCompletionChunk {
            choices: vec![ChunkChoice {
                delta: ChunkDelta::default(),
                finish_reason: Some("stop".into()),
            }],
            ..Default::default()
        },
    ]
}

/// Canned client that records every payload it receives.
pub struct FakeClient {
    api_version: String,
    completion: ChatCompletion,
    chunks: Vec<ChatCompletionChunk>,
    error_status: Option<u16>,
    requests: Mutex<Vec<CompletionPayload>>,
}

impl FakeClient {
    pub fn requests(&self) -> Vec<CompletionPayload> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    fn api_version(&self) -> &str {
        &self.api_version
    }

    async fn create_completion(
        &self,
        payload: &CompletionPayload,
    ) -> Result<Completion, AzureError> {
        self.requests.lock().unwrap().push(payload.clone());
        if let Some(status) = self.error_status {
            return Err(AzureError::api(status, "upstream failure"));
        }
        if payload.is_stream() {
            let chunks = self.chunks.clone().into_iter().map(Ok);
            Ok(Completion::Stream(futures::stream::iter(chunks).boxed()))
        } else {
            Ok(Completion::Response(self.completion.clone()))
        }
    }
}

/// Factory that hands out [`FakeClient`]s and remembers each one.
pub struct FakeFactory {
    completion: ChatCompletion,
    chunks: Vec<ChatCompletionChunk>,
    error_status: Option<u16>,
    created: Mutex<Vec<Arc<FakeClient>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            completion: ok_completion(),
            chunks: hello_chunks(),
            error_status: None,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            error_status: Some(status),
            ..Self::new()
        }
    }

    /// Number of clients constructed so far.
    pub fn creations(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn created_versions(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.api_version.clone())
            .collect()
    }

    /// Most recent payload sent through any client.
    pub fn last_payload(&self) -> Option<CompletionPayload> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .flat_map(|c| c.requests())
            .last()
    }
}

impl ClientFactory for FakeFactory {
    fn create(
        &self,
        _endpoint_url: &str,
        _api_key: &str,
        api_version: &str,
    ) -> Result<Arc<dyn ChatClient>, AzureError> {
        let client = Arc::new(FakeClient {
            api_version: api_version.to_string(),
            completion: self.completion.clone(),
            chunks: self.chunks.clone(),
            error_status: self.error_status,
            requests: Mutex::new(Vec::new()),
        });
        self.created.lock().unwrap().push(Arc::clone(&client));
        let client: Arc<dyn ChatClient> = client;
        Ok(client)
    }
}

/// Factory standing in for an unavailable HTTP stack.
pub struct MissingTransportFactory;

impl ClientFactory for MissingTransportFactory {
    fn create(&self, _: &str, _: &str, _: &str) -> Result<Arc<dyn ChatClient>, AzureError> {
        Err(AzureError::DependencyMissing("HTTP transport unavailable".into()))
    }
}

/// Provider over [`test_config`] backed by `factory`.
pub fn provider_with(factory: Arc<FakeFactory>) -> AzureOpenAiProvider {
    AzureOpenAiProvider::with_client_factory(test_config(), factory)
}
