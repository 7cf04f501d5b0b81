//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::changes::ChangesArgs;
use commands::jvm_options::JvmOptionsArgs;

#[derive(Parser, Debug)]
#[command(name = "procopts")]
#[command(about = "Resolve managed process options and inspect issue changes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .procopts/config.yaml + .procopts/local.yaml)
    #[arg(short, long, global = true, env = "PROCOPTS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search engine JVM options
    JvmOptions(JvmOptionsArgs),
    /// Issue comments and changelogs
    Changes(ChangesArgs),
}

/// Report a failed command and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({ "success": false, "error": err.to_string(), "causes": chain });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
