//! azure-deploy — Azure OpenAI behind a uniform model provider interface.
//!
//! Logical model names map to Azure deployments (API version, streaming flag,
//! context window, optional fixed temperature). Requests are translated to
//! the chat-completion payload, sent through a per-API-version client, and
//! the result is normalized into a [`types::ModelResponse`].
//!
//! # Quick Start
//!
//! ```no_run
//! use azure_deploy::prelude::*;
//!
//! # async fn example() -> azure_deploy::error::Result<()> {
//! let config = ProviderSettings::new("https://my-resource.openai.azure.com", "api-key")
//!     .deployment("gpt-4.1", DeploymentSettings::builder().deployment_name("gpt-4-1").build())
//!     .resolve()?;
//! let provider = AzureOpenAiProvider::new(config);
//!
//! let response = provider
//!     .generate_content(&GenerateRequest::new("Hello!", "gpt-4.1"))
//!     .await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
