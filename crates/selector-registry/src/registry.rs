//! Named selector lists keyed by `group.element`

use crate::catalog::{ProductMeta, ProductSelectors};
use locator_core::ExpressionList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN: &str = include_str!("selectors.yaml");

pub type SelectorGroup = BTreeMap<String, ExpressionList>;

/// Registry error enumeration
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown selector key: {0}")]
    UnknownKey(String),

    #[error("Unknown selector group: {0}")]
    UnknownGroup(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Keys take the form `group.element`
    #[error("Malformed selector key '{0}', expected group.element")]
    MalformedKey(String),

    #[error("Failed to read selector file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selector file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// On-disk layout of a selector file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorFile {
    pub groups: BTreeMap<String, SelectorGroup>,
    pub products: BTreeMap<String, ProductMeta>,
}

/// Read-only registry of selector lists and the product catalog.
///
/// Built once (built-in table plus optional overrides) and then shared
/// behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorRegistry {
    file: SelectorFile,
}

impl SelectorRegistry {
    /// Registry embedded at compile time
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml_str(BUILTIN)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, RegistryError> {
        let file: SelectorFile = serde_yaml::from_str(source)?;
        Ok(Self { file })
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        debug!("loading selector file {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    /// Overlay `overrides` on top of this registry. Entries present in the
    /// override replace the existing list wholesale; new groups, entries
    /// and products are added.
    pub fn merge(mut self, overrides: SelectorRegistry) -> Self {
        let mut replaced = 0usize;
        for (group, entries) in overrides.file.groups {
            let target = self.file.groups.entry(group).or_default();
            for (name, expressions) in entries {
                if target.insert(name, expressions).is_some() {
                    replaced += 1;
                }
            }
        }
        for (key, meta) in overrides.file.products {
            if self.file.products.insert(key, meta).is_some() {
                replaced += 1;
            }
        }
        info!("merged selector overrides ({} replaced)", replaced);
        self
    }

    /// Look up `group.element`
    pub fn get(&self, key: &str) -> Result<&ExpressionList, RegistryError> {
        let (group, name) = split_key(key)?;
        self.file
            .groups
            .get(group)
            .and_then(|entries| entries.get(name))
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    pub fn group(&self, name: &str) -> Result<&SelectorGroup, RegistryError> {
        self.file
            .groups
            .get(name)
            .ok_or_else(|| RegistryError::UnknownGroup(name.to_string()))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.file.groups.keys().map(String::as_str)
    }

    /// Every entry as `(group.element, expressions)` in key order
    pub fn entries(&self) -> impl Iterator<Item = (String, &ExpressionList)> {
        self.file.groups.iter().flat_map(|(group, entries)| {
            entries
                .iter()
                .map(move |(name, expressions)| (format!("{}.{}", group, name), expressions))
        })
    }

    pub fn product_meta(&self, key: &str) -> Result<&ProductMeta, RegistryError> {
        self.file
            .products
            .get(key)
            .ok_or_else(|| RegistryError::UnknownProduct(key.to_string()))
    }

    pub fn product(&self, key: &str) -> Result<ProductSelectors, RegistryError> {
        self.product_meta(key).map(ProductSelectors::derive)
    }

    pub fn product_keys(&self) -> impl Iterator<Item = &str> {
        self.file.products.keys().map(String::as_str)
    }

    /// Catalog entry whose display name matches `name`, ignoring
    /// surrounding whitespace
    pub fn product_by_name(&self, name: &str) -> Option<(&str, &ProductMeta)> {
        let name = name.trim();
        self.file
            .products
            .iter()
            .find(|(_, meta)| meta.display_name == name)
            .map(|(key, meta)| (key.as_str(), meta))
    }

    pub fn as_file(&self) -> &SelectorFile {
        &self.file
    }
}

fn split_key(key: &str) -> Result<(&str, &str), RegistryError> {
    match key.split_once('.') {
        Some((group, name)) if !group.is_empty() && !name.is_empty() => Ok((group, name)),
        _ => Err(RegistryError::MalformedKey(key.to_string())),
    }
}
