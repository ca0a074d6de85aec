//! Core types for the resolution layer

use crate::{errors::LocatorError, union::CombinedExpression};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered, non-empty list of locator expressions for one logical element.
///
/// Order encodes priority: earlier expressions are preferred when several
/// would match. Duplicates are kept here and only collapsed when a union
/// query is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SelectorInput", into = "Vec<String>")]
pub struct ExpressionList(Vec<String>);

impl ExpressionList {
    /// Create a list, rejecting empty input
    pub fn new<I, S>(expressions: I) -> Result<Self, LocatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expressions: Vec<String> = expressions.into_iter().map(Into::into).collect();
        if expressions.is_empty() {
            return Err(LocatorError::EmptyExpressionList);
        }
        Ok(Self(expressions))
    }

    /// Wrap a single expression
    pub fn single(expression: impl Into<String>) -> Self {
        Self(vec![expression.into()])
    }

    /// Append a lower-priority fallback
    pub fn with_fallback(mut self, expression: impl Into<String>) -> Self {
        self.0.push(expression.into());
        self
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl fmt::Display for ExpressionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl From<ExpressionList> for Vec<String> {
    fn from(list: ExpressionList) -> Self {
        list.0
    }
}

impl TryFrom<Vec<String>> for ExpressionList {
    type Error = LocatorError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&[&str]> for ExpressionList {
    type Error = LocatorError;

    fn try_from(value: &[&str]) -> Result<Self, Self::Error> {
        Self::new(value.iter().copied())
    }
}

/// Either one expression or many, as found in hand-written selector files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SelectorInput {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<SelectorInput> for ExpressionList {
    type Error = LocatorError;

    fn try_from(value: SelectorInput) -> Result<Self, Self::Error> {
        match value {
            SelectorInput::One(expression) => Ok(Self::single(expression)),
            SelectorInput::Many(expressions) => Self::new(expressions),
        }
    }
}

/// Engine-assigned reference to one live element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Region of the page a query searches within.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// Whole document
    #[default]
    Document,

    /// Descendants of a previously resolved element
    Element(ElementRef),

    /// Descendants of every element matching `expression` inside `parent`
    Collection {
        parent: Box<Scope>,
        expression: CombinedExpression,
    },
}

impl Scope {
    pub fn element(element: ElementRef) -> Self {
        Scope::Element(element)
    }

    pub fn collection(parent: Scope, expression: CombinedExpression) -> Self {
        Scope::Collection {
            parent: Box::new(parent),
            expression,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Document => f.write_str("document"),
            Scope::Element(element) => write!(f, "element({})", element),
            Scope::Collection { parent, expression } => {
                write!(f, "{} >> all({})", parent, expression)
            }
        }
    }
}

/// Options for a single-element resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Also require the match to be enabled, not merely visible
    pub require_interactive: bool,
}

impl ResolveOptions {
    pub fn interactive() -> Self {
        Self {
            require_interactive: true,
        }
    }
}

/// Call-scoped reference to the element a resolution settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    /// Matched element
    pub element: ElementRef,

    /// Expression that produced the match
    pub expression: String,

    /// Position of `expression` in the input list
    pub expression_index: usize,
}

impl Handle {
    /// Scope for nested queries under this element
    pub fn scope(&self) -> Scope {
        Scope::Element(self.element.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_are_rejected() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            ExpressionList::new(empty),
            Err(LocatorError::EmptyExpressionList)
        );
    }

    #[test]
    fn deserializes_single_string_or_list() {
        let one: ExpressionList = serde_json::from_str(r##""#login-button""##).unwrap();
        assert_eq!(one.as_slice(), ["#login-button"]);

        let many: ExpressionList =
            serde_json::from_str(r##"["[data-test=\"username\"]", "#user-name"]"##).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many.iter().nth(1), Some("#user-name"));

        let empty: Result<ExpressionList, _> = serde_json::from_str("[]");
        assert!(empty.is_err());
    }

    #[test]
    fn scope_display_describes_chain() {
        let rows = crate::union::union_query(&[".cart_item".to_string()]);
        let scope = Scope::collection(Scope::Document, rows);
        assert_eq!(scope.to_string(), "document >> all(.cart_item)");
    }
}
