//! Script evaluation seam

use async_trait::async_trait;
use locator_core::EngineError;
use serde_json::Value;

/// Evaluates a JavaScript expression in the page and returns its JSON value.
#[async_trait]
pub trait ScriptRuntime: Send + Sync {
    async fn evaluate(&self, expression: &str) -> Result<Value, EngineError>;
}
