//! Command-line surface: the gateway server, the interactive wizard and
//! offline helpers for generating and validating form files.

mod commands;
mod view;
mod wizard;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::generation::ToolSelection;

/// `reentry` - disclosure narratives and pre-adverse action response letters.
#[derive(Parser, Debug)]
#[command(name = "reentry")]
#[command(version)]
#[command(about = "Guided disclosure documents for job seekers with a record.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the generation gateway (HTTP API)
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Walk through the form in the terminal and generate documents
    Wizard {
        /// narrative, responseLetter or both (asked interactively when omitted)
        #[arg(short, long)]
        tool: Option<ToolSelection>,

        /// Gateway base URL (overrides config)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Generate documents from a form data JSON file without a gateway
    Generate {
        /// Path to a JSON file holding form data (camelCase keys)
        input: PathBuf,

        /// narrative, responseLetter or both
        #[arg(short, long, default_value = "both")]
        selection: ToolSelection,

        /// Write the result JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a saved form state JSON file and list validation errors
    Validate {
        /// Path to a JSON file holding form state
        input: PathBuf,

        /// Check a single step (1-based) instead of the whole form
        #[arg(long)]
        step: Option<usize>,
    },
}

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            config.validate()?;
            crate::gateway::run_gateway(&config).await
        }
        Commands::Wizard { tool, api_url } => {
            if let Some(api_url) = api_url {
                config.client.api_url = api_url;
            }
            config.validate()?;
            wizard::run(&config, tool).await
        }
        Commands::Generate {
            input,
            selection,
            output,
        } => commands::generate(&config, &input, selection, output.as_deref()).await,
        Commands::Validate { input, step } => commands::validate(&input, step),
    }
}
