//! CLI for inspecting and calling configured Azure deployments.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// azure-deploy CLI
#[derive(Parser, Debug)]
#[command(name = "azure-deploy", version, about = "Azure OpenAI deployment adapter CLI")]
pub struct Cli {
    /// TOML settings file (defaults to AZURE_OPENAI_* environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured deployments
    Models,
    /// Show capabilities of a logical model
    Capabilities(CapabilitiesArgs),
    /// Generate a response
    Generate(GenerateArgs),
}

/// Arguments for `azure-deploy capabilities`.
#[derive(Parser, Debug)]
pub struct CapabilitiesArgs {
    /// Logical model name
    pub model: String,
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Logical model name
    pub model: String,

    /// User prompt
    pub prompt: String,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max output tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Force streaming on
    #[arg(long, conflicts_with = "no_stream")]
    pub stream: bool,

    /// Force streaming off
    #[arg(long)]
    pub no_stream: bool,
}

impl GenerateArgs {
    /// Explicit streaming choice, if any.
    pub fn stream_override(&self) -> Option<bool> {
        match (self.stream, self.no_stream) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
