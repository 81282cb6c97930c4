//! azure-deploy CLI binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use azure_deploy::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match commands::load_provider(cli.config.as_deref()) {
        Ok(provider) => match cli.command {
            Commands::Models => {
                commands::handle_models(&provider);
                Ok(())
            }
            Commands::Capabilities(args) => commands::handle_capabilities(&provider, &args.model),
            Commands::Generate(args) => commands::handle_generate(&provider, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
