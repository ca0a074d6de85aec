//! Error type for registry-driven lookups

use locator_core::LocatorError;
use selector_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error("{product} has no selector named '{field}'")]
    UnknownProductField { product: String, field: String },
}

pub type ProbeResult<T> = Result<T, ProbeError>;
