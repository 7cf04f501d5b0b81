//! Search engine JVM options commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::application::{PreparedLaunch, SearchLaunchPreparer};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct JvmOptionsArgs {
    #[command(subcommand)]
    pub command: JvmOptionsCommands,
}

#[derive(Subcommand, Debug)]
pub enum JvmOptionsCommands {
    /// Print the resolved options without writing anything
    Show {
        /// Extra option merged after the configured ones (repeatable)
        #[arg(short, long = "add", allow_hyphen_values = true)]
        add: Vec<String>,
    },
    /// Resolve and write the jvm.options file
    Write {
        /// Target file (defaults to search.jvm_options_path)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Extra option merged after the configured ones (repeatable)
        #[arg(short, long = "add", allow_hyphen_values = true)]
        add: Vec<String>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ResolvedOptionsOutput {
    pub options: Vec<String>,
    pub overridden_defaults: Vec<String>,
}

impl CommandOutput for ResolvedOptionsOutput {
    fn to_human(&self) -> String {
        let mut lines = self.options.clone();
        if !self.overridden_defaults.is_empty() {
            lines.push(String::new());
            lines.push("Overridden defaults:".to_string());
            lines.extend(self.overridden_defaults.iter().map(|o| format!("  {o}")));
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct WrittenOptionsOutput {
    pub success: bool,
    #[serde(flatten)]
    pub launch: PreparedLaunch,
}

impl CommandOutput for WrittenOptionsOutput {
    fn to_human(&self) -> String {
        let mut message = format!(
            "Wrote {} option(s) to {}",
            self.launch.options.len(),
            self.launch.jvm_options_path.display()
        );
        if !self.launch.overridden_defaults.is_empty() {
            message.push_str(&format!(
                " ({} default(s) overridden)",
                self.launch.overridden_defaults.len()
            ));
        }
        message
    }
}

pub fn execute(args: JvmOptionsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let preparer = SearchLaunchPreparer::new(config.search.clone());

    match args.command {
        JvmOptionsCommands::Show { add } => {
            let (options, overridden_defaults) = preparer.resolve(&add)?;
            let out = ResolvedOptionsOutput {
                options: options.get_all(),
                overridden_defaults,
            };
            output(&out, json_mode);
        }

        JvmOptionsCommands::Write { path, add } => {
            let launch = match path {
                Some(path) => preparer.prepare_at(&path, &add)?,
                None => preparer.prepare(&add)?,
            };
            let out = WrittenOptionsOutput {
                success: true,
                launch,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
