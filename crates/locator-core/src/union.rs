//! Union queries over fallback expressions and lazy collection handles

use crate::{
    engine::QueryEngine,
    errors::LocatorError,
    types::{ElementRef, Scope},
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Single query matching any of its member expressions.
///
/// Members are unique, non-empty, and keep first-seen order. The rendered
/// form is a CSS selector list, so matches come back in document order
/// regardless of member order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinedExpression {
    members: Vec<String>,
    joined: String,
}

impl CombinedExpression {
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn as_str(&self) -> &str {
        &self.joined
    }

    /// True when every input entry was empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for CombinedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}

/// Build the union of `expressions`: drop empty entries, dedupe keeping the
/// first occurrence, join with `,`.
pub fn union_query<I, S>(expressions: I) -> CombinedExpression
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for expression in expressions {
        let expression = expression.as_ref();
        if expression.trim().is_empty() {
            continue;
        }
        if seen.insert(expression.to_string()) {
            members.push(expression.to_string());
        }
    }
    let joined = members.join(",");
    CombinedExpression { members, joined }
}

/// Lazily evaluated reference to every element matching a combined
/// expression inside a scope. Nothing touches the engine until one of the
/// async readers is awaited.
#[derive(Clone)]
pub struct CollectionHandle {
    engine: Arc<dyn QueryEngine>,
    scope: Scope,
    expression: CombinedExpression,
    has_text: Option<String>,
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("scope", &self.scope)
            .field("expression", &self.expression)
            .field("has_text", &self.has_text)
            .finish()
    }
}

impl CollectionHandle {
    pub(crate) fn new(
        engine: Arc<dyn QueryEngine>,
        scope: Scope,
        expression: CombinedExpression,
    ) -> Self {
        Self {
            engine,
            scope,
            expression,
            has_text: None,
        }
    }

    pub fn expression(&self) -> &CombinedExpression {
        &self.expression
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Narrow to elements whose text content contains `text`
    pub fn filter_has_text(&self, text: impl Into<String>) -> Self {
        Self {
            has_text: Some(text.into()),
            ..self.clone()
        }
    }

    /// Use this collection as the search root for nested queries.
    ///
    /// Text filters are not carried into the scope.
    pub fn as_scope(&self) -> Scope {
        Scope::collection(self.scope.clone(), self.expression.clone())
    }

    /// Materialize matched elements in document order
    pub async fn elements(&self) -> Result<Vec<ElementRef>, LocatorError> {
        if self.expression.is_empty() {
            return Ok(Vec::new());
        }
        let elements = self.engine.query_all(&self.scope, &self.expression).await?;
        let Some(needle) = &self.has_text else {
            return Ok(elements);
        };

        let mut filtered = Vec::new();
        for element in elements {
            let text = self.engine.text_content(&element).await?;
            if text.is_some_and(|t| t.contains(needle.as_str())) {
                filtered.push(element);
            }
        }
        debug!(
            "Text filter '{}' kept {} element(s) of {}",
            needle,
            filtered.len(),
            self.expression
        );
        Ok(filtered)
    }

    pub async fn count(&self) -> Result<usize, LocatorError> {
        if self.expression.is_empty() {
            return Ok(0);
        }
        if self.has_text.is_some() {
            return Ok(self.elements().await?.len());
        }
        Ok(self.engine.count(&self.scope, &self.expression).await?)
    }

    pub async fn first(&self) -> Result<Option<ElementRef>, LocatorError> {
        Ok(self.elements().await?.into_iter().next())
    }

    /// Text content of every element; trimmed when `trim` is set
    pub async fn texts(&self, trim: bool) -> Result<Vec<String>, LocatorError> {
        if self.expression.is_empty() {
            return Ok(Vec::new());
        }
        let raw = if self.has_text.is_some() {
            let mut texts = Vec::new();
            for element in self.elements().await? {
                texts.push(self.engine.text_content(&element).await?.unwrap_or_default());
            }
            texts
        } else {
            self.engine
                .all_text_contents(&self.scope, &self.expression)
                .await?
        };

        if trim {
            Ok(raw.into_iter().map(|t| t.trim().to_string()).collect())
        } else {
            Ok(raw)
        }
    }
}
