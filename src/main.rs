//! promptpad - page-to-prompt workbench for the terminal
//!
//! Extract a page into an editable slot, assemble a prompt from a template
//! with live token and price estimates, and stream the model's answer back
//! into the slot.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod ai;
mod cli;
mod config;
mod core;
mod errors;
mod prompt;
mod ui;

use cli::PromptArgs;

/// promptpad - extract, prompt, stream
#[derive(Parser)]
#[command(name = "promptpad")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build AI prompts from web pages and stream the answers back", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a page (URL or file) into a module's editor slot
    Extract {
        /// URL or local file
        source: String,

        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Print the editor slot of a module
    Show {
        #[arg(short, long, default_value = "translation")]
        module: String,
    },

    /// Render the prepared prompt with token and price estimates
    Prompt {
        #[command(flatten)]
        prompt: PromptArgs,

        /// Print the prepared prompt as JSON
        #[arg(long)]
        json: bool,
    },

    /// Watch the exported slot file and recompute estimates on edits
    Watch {
        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Send the prompt and stream the response into the slot
    Send {
        #[command(flatten)]
        prompt: PromptArgs,

        /// Only print the response, leave the slot untouched
        #[arg(long)]
        print_only: bool,
    },

    /// Save the prepared prompt as a shareable JSON document
    Share {
        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Store or show provider API keys
    Settings {
        /// Provider (openai, perplexity)
        #[arg(short, long)]
        provider: Option<String>,

        /// API key, prompted for when omitted
        #[arg(short, long)]
        key: Option<String>,

        /// Show which keys are configured
        #[arg(long)]
        show: bool,
    },

    /// List supported models
    Models,

    /// List stored editor slots
    Slots {
        /// Delete the named slot
        #[arg(long, value_name = "NAME")]
        delete: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize configuration file
        #[arg(long)]
        init: bool,
    },

    /// Show version and system info
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!("Command failed: {:?}", e);
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = config::load_config(cli.config.as_deref())?;

    info!("promptpad v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Extract { source, prompt } => {
            cli::extract::run(config, &source, &prompt).await?;
        }
        Commands::Show { module } => {
            cli::show::run(config, &module)?;
        }
        Commands::Prompt { prompt, json } => {
            cli::prompt::run(config, &prompt, json).await?;
        }
        Commands::Watch { prompt } => {
            cli::watch::run(config, &prompt).await?;
        }
        Commands::Send { prompt, print_only } => {
            cli::send::run(config, &prompt, print_only).await?;
        }
        Commands::Share { prompt } => {
            cli::share::run(config, &prompt).await?;
        }
        Commands::Settings { provider, key, show } => {
            cli::settings::run(config, provider.as_deref(), key, show)?;
        }
        Commands::Models => {
            cli::models::run(&config)?;
        }
        Commands::Slots { delete } => {
            cli::slots::run(&config, delete.as_deref())?;
        }
        Commands::Config { show, init } => {
            if init {
                config::init_config(cli.config.as_deref())?;
            } else if show {
                config::show_config(&config)?;
            }
        }
        Commands::Info => {
            cli::info::run(&config)?;
        }
    }

    Ok(())
}
