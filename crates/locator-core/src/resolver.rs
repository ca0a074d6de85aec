//! Element resolver with ordered fallback expressions

use crate::{
    engine::QueryEngine,
    errors::LocatorError,
    types::{ElementRef, ExpressionList, Handle, ResolveOptions, Scope},
    union::{union_query, CollectionHandle},
};
use std::sync::Arc;
use tracing::debug;

/// Resolves logical elements against a [`QueryEngine`].
///
/// Holds no state besides the engine; each call re-resolves from scratch.
#[derive(Clone)]
pub struct Resolver {
    engine: Arc<dyn QueryEngine>,
}

impl Resolver {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn QueryEngine> {
        &self.engine
    }

    /// Resolve the first usable element or fail with `LocatorNotFound`
    /// naming every expression tried.
    pub async fn resolve_required(
        &self,
        scope: &Scope,
        expressions: &ExpressionList,
        options: ResolveOptions,
    ) -> Result<Handle, LocatorError> {
        match self.first_passing(scope, expressions, options).await? {
            Some(handle) => Ok(handle),
            None => Err(LocatorError::LocatorNotFound {
                expressions: expressions.to_vec(),
            }),
        }
    }

    /// Resolve the first visible element, or `None` when nothing passes.
    pub async fn resolve_optional(
        &self,
        scope: &Scope,
        expressions: &ExpressionList,
    ) -> Result<Option<Handle>, LocatorError> {
        self.first_passing(scope, expressions, ResolveOptions::default())
            .await
    }

    /// Collection of every element matching any expression. No I/O happens
    /// until the handle is read.
    pub fn resolve_collection(&self, scope: &Scope, expressions: &ExpressionList) -> CollectionHandle {
        CollectionHandle::new(
            self.engine.clone(),
            scope.clone(),
            union_query(expressions.iter()),
        )
    }

    async fn first_passing(
        &self,
        scope: &Scope,
        expressions: &ExpressionList,
        options: ResolveOptions,
    ) -> Result<Option<Handle>, LocatorError> {
        for (index, expression) in expressions.iter().enumerate() {
            debug!("Trying expression {} in {}: {}", index, scope, expression);

            // Only the first DOM match of each expression is considered. A
            // failed query (malformed expression, torn-down scope) only rules
            // out this expression.
            let element = match self.engine.query_first(scope, expression).await {
                Ok(Some(element)) => element,
                Ok(None) => {
                    debug!("No match for {}", expression);
                    continue;
                }
                Err(err) => {
                    debug!("Query failed for {}: {}", expression, err);
                    continue;
                }
            };

            if !self.passes_gates(&element, options).await {
                continue;
            }

            debug!("Resolved {} via expression {}: {}", element, index, expression);
            return Ok(Some(Handle {
                element,
                expression: expression.to_string(),
                expression_index: index,
            }));
        }
        Ok(None)
    }

    /// Gate errors count as a failed gate.
    async fn passes_gates(&self, element: &ElementRef, options: ResolveOptions) -> bool {
        match self.engine.is_visible(element).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("{} is not visible", element);
                return false;
            }
            Err(err) => {
                debug!("Visibility check failed for {}: {}", element, err);
                return false;
            }
        }

        if !options.require_interactive {
            return true;
        }

        match self.engine.is_enabled(element).await {
            Ok(enabled) => {
                if !enabled {
                    debug!("{} is not enabled", element);
                }
                enabled
            }
            Err(err) => {
                debug!("Enabled check failed for {}: {}", element, err);
                false
            }
        }
    }
}
