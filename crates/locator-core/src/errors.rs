//! Error types for the resolution layer

use thiserror::Error;

/// Failures reported by a [`QueryEngine`](crate::engine::QueryEngine).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Element was detached or replaced after it was matched
    #[error("Stale element reference: {0}")]
    Stale(String),

    /// Expression rejected by the underlying matcher
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Browser/driver communication failure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stale references are the one failure class the text path recovers from.
    pub fn is_stale(&self) -> bool {
        matches!(self, EngineError::Stale(_))
    }
}

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No expression in the list produced a passing element
    #[error("No matching locator found for: {}", .expressions.join(", "))]
    LocatorNotFound { expressions: Vec<String> },

    /// Two related batch reads returned different lengths
    #[error("{context}: mismatched counts: left({left}) vs right({right})")]
    CollectionMismatch {
        context: String,
        left: usize,
        right: usize,
    },

    /// Expression lists must carry at least one entry
    #[error("Expression list is empty")]
    EmptyExpressionList,

    /// Engine failure that is not a gate check
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl LocatorError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LocatorError::Engine(EngineError::Stale(_)) | LocatorError::Engine(EngineError::Protocol(_))
        )
    }
}
