use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use selector_registry::SelectorRegistry;

use super::runtime::LoadedConfig;
use crate::config::ProbeConfig;

pub struct CliContext {
    config: Arc<ProbeConfig>,
    config_path: PathBuf,
    config_found: bool,
    registry: Arc<SelectorRegistry>,
}

impl CliContext {
    pub fn new(loaded: LoadedConfig) -> Result<Self> {
        let registry = loaded.config.build_registry(loaded.base_dir())?;
        Ok(Self {
            config: Arc::new(loaded.config),
            config_path: loaded.path,
            config_found: loaded.found,
            registry,
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_found(&self) -> bool {
        self.config_found
    }

    pub fn registry(&self) -> &Arc<SelectorRegistry> {
        &self.registry
    }
}
