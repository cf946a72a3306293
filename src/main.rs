use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::log::init_logging;

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

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => {
                fxconv::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates { base } => fxconv::AppCommand::Rates { base },
            Commands::Favorites { toggle } => fxconv::AppCommand::Favorites {
                toggle: toggle.and_then(|mut pair| {
                    let to = pair.pop()?;
                    let from = pair.pop()?;
                    Some((from, to))
                }),
            },
            Commands::History => fxconv::AppCommand::History,
            Commands::Session => fxconv::AppCommand::Session,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount into one or more currencies
    Convert {
        /// Amount in the source currency
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Source currency code, e.g. inr
        from: String,
        /// Target currency codes
        #[arg(required = true)]
        to: Vec<String>,
    },
    /// Show exchange rates for a base currency
    Rates { base: String },
    /// List favorite currency pairs
    Favorites {
        /// Add or remove a pair
        #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
        toggle: Option<Vec<String>>,
    },
    /// Show conversion history
    History,
    /// Start an interactive conversion session
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
