//! procopts CLI entry point.

use clap::Parser;

use procopts::cli::{handle_error, Cli, Commands};
use procopts::infrastructure::config::ConfigLoader;
use procopts::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::JvmOptions(args) => {
            procopts::cli::commands::jvm_options::execute(args, &config, cli.json)
        }
        Commands::Changes(args) => {
            procopts::cli::commands::changes::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
