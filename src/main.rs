use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxcache::core::log::init_logging;

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

impl From<Commands> for fxcache::AppCommand {
    fn from(cmd: Commands) -> fxcache::AppCommand {
        match cmd {
            Commands::Currencies => fxcache::AppCommand::Currencies,
            Commands::Convert { amount, from } => fxcache::AppCommand::Convert { amount, from },
            Commands::Refresh { retries } => fxcache::AppCommand::Refresh { retries },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List known currency codes with their USD rates
    Currencies,
    /// Convert an amount into every known currency
    Convert {
        /// Amount of the source currency
        amount: f64,
        /// Source currency code, defaults to the configured currency
        #[arg(short, long)]
        from: Option<String>,
    },
    /// Fetch the latest rates unless they were refreshed recently
    Refresh {
        /// Retry attempts for transient failures
        #[arg(short, long, default_value_t = 0)]
        retries: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxcache::cli::setup::setup(),
        Some(cmd) => fxcache::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
