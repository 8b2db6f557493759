use anyhow::Result;
use clap::{Parser, Subcommand};
use currency_service::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Port to listen on, overrides config and PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create default configuration
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => currency_service::setup::setup(),
        Some(Commands::Serve { port }) => {
            currency_service::run(cli.config_path.as_deref(), port).await
        }
        None => currency_service::run(cli.config_path.as_deref(), None).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
