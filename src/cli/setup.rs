use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Bundled example configuration written by `setup`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Creates a default configuration file with example content at the default location
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path)
}

/// Creates a default configuration file with example content at the specified path
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    println!("Created default configuration at {}", path.display());
    Ok(())
}
