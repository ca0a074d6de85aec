use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ProbeConfig;

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: ProbeConfig,
    pub path: PathBuf,
    /// False when `path` did not exist and defaults were used
    pub found: bool,
}

impl LoadedConfig {
    pub fn base_dir(&self) -> Option<&Path> {
        if self.found {
            self.path.parent()
        } else {
            None
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    // Priority: ./config/probe.yaml > ~/.config/storefront-probe/config.yaml
    let local_config = PathBuf::from("config/probe.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("storefront-probe");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config: ProbeConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
            found: true,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: ProbeConfig::default(),
            path: config_path,
            found: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        std::fs::write(&path, "strict_columns: true\n").unwrap();

        let loaded = load_config(Some(&path)).await.unwrap();
        assert!(loaded.found);
        assert!(loaded.config.strict_columns);
        assert_eq!(loaded.base_dir(), Some(dir.path()));
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let loaded = load_config(Some(&path)).await.unwrap();
        assert!(!loaded.found);
        assert_eq!(loaded.config, ProbeConfig::default());
        assert!(loaded.base_dir().is_none());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "strict_columns: [nope\n").unwrap();

        assert!(load_config(Some(&path)).await.is_err());
    }
}
