//! Query engine seam
//!
//! The resolution layer treats the browser as a black-box query/read service.
//! Every method is a suspension point; none of them mutate the page.

use crate::{
    errors::EngineError,
    types::{ElementRef, Scope},
    union::CombinedExpression,
};
use async_trait::async_trait;

/// Primitive query, gate, and read operations the resolver composes.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// First element in document order matching `expression` within `scope`
    async fn query_first(
        &self,
        scope: &Scope,
        expression: &str,
    ) -> Result<Option<ElementRef>, EngineError>;

    /// All elements matching any member of `expression`, in document order
    async fn query_all(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<Vec<ElementRef>, EngineError>;

    /// Number of elements `query_all` would return
    async fn count(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<usize, EngineError> {
        Ok(self.query_all(scope, expression).await?.len())
    }

    /// Visibility gate
    async fn is_visible(&self, element: &ElementRef) -> Result<bool, EngineError>;

    /// Interactability gate
    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, EngineError>;

    /// Raw text content; `None` when the element carries none
    async fn text_content(&self, element: &ElementRef) -> Result<Option<String>, EngineError>;

    /// Text content of every match, in document order.
    ///
    /// Engines that can read a whole collection in one round trip should
    /// override this.
    async fn all_text_contents(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<Vec<String>, EngineError> {
        let elements = self.query_all(scope, expression).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            texts.push(self.text_content(element).await?.unwrap_or_default());
        }
        Ok(texts)
    }
}
