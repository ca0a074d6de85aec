//! storefront-probe library
//!
//! Exposes the registry-keyed session and the CLI for integration testing

pub mod cli;
pub mod config;
pub mod errors;
pub mod session;

pub use config::ProbeConfig;
pub use errors::{ProbeError, ProbeResult};
pub use session::ProbeSession;
