//! Probe configuration
//!
//! Loaded from YAML by the CLI (see `cli::runtime::load_config`); every field
//! has a default so an absent file is equivalent to an empty one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use locator_core::ColumnPolicy;
use script_engine::ChromiumSettings;
use selector_registry::SelectorRegistry;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Selector file merged over the built-in registry
    pub registry_overrides: Option<PathBuf>,

    /// Fail paired column reads on length mismatch instead of truncating
    pub strict_columns: bool,

    pub chromium: ChromiumSettings,
}

impl ProbeConfig {
    pub fn column_policy(&self) -> ColumnPolicy {
        ColumnPolicy::from_strict(self.strict_columns)
    }

    /// Built-in registry with the configured overrides applied. Relative
    /// override paths are taken relative to `base_dir`.
    pub fn build_registry(&self, base_dir: Option<&Path>) -> Result<Arc<SelectorRegistry>> {
        let registry = SelectorRegistry::builtin().context("Built-in selector table is invalid")?;
        let Some(overrides) = &self.registry_overrides else {
            return Ok(Arc::new(registry));
        };

        let path = match base_dir {
            Some(dir) if overrides.is_relative() => dir.join(overrides),
            _ => overrides.clone(),
        };
        let overrides = SelectorRegistry::load(&path)
            .with_context(|| format!("Failed to load selector overrides from {}", path.display()))?;
        info!("Applying selector overrides from {}", path.display());
        Ok(Arc::new(registry.merge(overrides)))
    }
}
