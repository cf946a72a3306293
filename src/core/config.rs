use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATES_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_RATES_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Initial state of a fresh conversion form.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FormDefaults {
    pub from: CurrencyCode,
    pub targets: Vec<CurrencyCode>,
    pub new_target: CurrencyCode,
}

impl Default for FormDefaults {
    fn default() -> Self {
        FormDefaults {
            from: CurrencyCode::from_static("inr"),
            targets: vec![CurrencyCode::from_static("usd")],
            new_target: CurrencyCode::from_static("eur"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub defaults: FormDefaults,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if config.defaults.targets.is_empty() {
            anyhow::bail!(
                "Config file {} must list at least one default target currency",
                path.as_ref().display()
            );
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}
