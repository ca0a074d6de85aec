//! Script-backed query engine
//!
//! Implements [`locator_core::QueryEngine`] by generating page scripts and
//! evaluating them through a [`ScriptRuntime`]. With the `chromium` feature
//! a [`ChromiumRuntime`] drives a real browser page over CDP.

pub mod chromium;
pub mod engine;
pub mod runtime;
pub mod scripts;

pub use chromium::ChromiumSettings;
#[cfg(feature = "chromium")]
pub use chromium::ChromiumRuntime;
pub use engine::ScriptEngine;
pub use runtime::ScriptRuntime;
