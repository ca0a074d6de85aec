//! Resilient element resolution and batch text extraction
//!
//! This crate implements the lookup layer page objects are built on:
//! - Ordered fallback expressions with visibility/enabled gating
//! - Union queries for collections, matched in document order
//! - Single-value text reads with one-shot stale recovery
//! - Batch and row-aligned column reads
//! - An in-memory page engine for deterministic tests

pub mod engine;
pub mod errors;
pub mod memory;
pub mod resolver;
pub mod text;
pub mod types;
pub mod union;

pub use engine::*;
pub use errors::*;
pub use memory::*;
pub use resolver::*;
pub use text::*;
pub use types::*;
pub use union::*;
