use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agriai::cli::commands::serve::ServeOptions;
use agriai::config::ConfigFormat;

#[derive(Parser)]
#[command(name = "agriai")]
#[command(
    version,
    about = "Farm management backend with AI agronomy and feeding advice"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the project config and database schema
    Init,

    /// Run the HTTP API
    Serve {
        #[arg(long, help = "Bind address (overrides server.host)")]
        host: Option<String>,
        #[arg(long, short, help = "Port (overrides server.port)")]
        port: Option<u16>,
        #[arg(long, help = "SQLite file (overrides database.path)")]
        database: Option<PathBuf>,
        #[arg(long, help = "LLM provider: gemini, openai, fake")]
        provider: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Write a starter configuration file
    Init {
        #[arg(long, short, help = "Write the global config instead of ./agriai.toml")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            agriai::cli::ui::error(format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init => {
            agriai::cli::commands::init::run()?;
        }
        Commands::Serve {
            host,
            port,
            database,
            provider,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(agriai::cli::commands::serve::run(ServeOptions {
                host,
                port,
                database,
                provider,
            }))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                agriai::cli::commands::config::show(format)?;
            }
            ConfigAction::Path => {
                agriai::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                agriai::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
