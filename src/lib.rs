pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

/// Commands that need configuration, storage and a rate provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Convert {
        amount: f64,
        from: String,
        to: Vec<String>,
    },
    Rates {
        base: String,
    },
    Favorites {
        toggle: Option<(String, String)>,
    },
    History,
    Session,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::currency_api::CurrencyApiProvider::new(
        &config.provider.base_url,
        Duration::from_secs(config.provider.timeout_secs),
    )?;

    match command {
        AppCommand::Rates { base } => cli::rates::run(&provider, &base).await,
        AppCommand::Convert { amount, from, to } => {
            let storage = store::open_storage(&config)?;
            cli::convert::run(&config.defaults, storage, &provider, amount, &from, &to).await
        }
        AppCommand::Favorites { toggle } => {
            let storage = store::open_storage(&config)?;
            let toggle = toggle
                .as_ref()
                .map(|(from, to)| (from.as_str(), to.as_str()));
            cli::favorites::run(storage, toggle)
        }
        AppCommand::History => {
            let storage = store::open_storage(&config)?;
            cli::history::run(storage)
        }
        AppCommand::Session => {
            let storage = store::open_storage(&config)?;
            cli::session::run(&config.defaults, storage, &provider).await
        }
    }
}
