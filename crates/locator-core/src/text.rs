//! Text extraction: single values with one-shot detach recovery, batch
//! reads through union queries, and row-aligned column reads.

use crate::{
    errors::LocatorError,
    resolver::Resolver,
    types::{ExpressionList, Scope},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How paired column reads handle unequal lengths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Warn and truncate to the shorter column
    #[default]
    Lenient,

    /// Fail with `CollectionMismatch`
    Strict,
}

impl ColumnPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ColumnPolicy::Strict
        } else {
            ColumnPolicy::Lenient
        }
    }
}

/// Lengths of two columns that did not line up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMismatch {
    pub left: usize,
    pub right: usize,
}

/// Zipped rows from two independent batch reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairedRows {
    pub rows: Vec<(String, String)>,

    /// Set when the columns differed and rows were truncated
    pub mismatch: Option<ColumnMismatch>,
}

/// Zip two columns, validating their lengths under `policy`.
pub fn zip_columns(
    context: &str,
    left: Vec<String>,
    right: Vec<String>,
    policy: ColumnPolicy,
) -> Result<PairedRows, LocatorError> {
    let mismatch = (left.len() != right.len()).then_some(ColumnMismatch {
        left: left.len(),
        right: right.len(),
    });

    if let Some(m) = mismatch {
        if policy == ColumnPolicy::Strict {
            return Err(LocatorError::CollectionMismatch {
                context: context.to_string(),
                left: m.left,
                right: m.right,
            });
        }
        warn!(
            "{}: mismatched counts: left({}) vs right({}); truncating to {}",
            context,
            m.left,
            m.right,
            m.left.min(m.right)
        );
    }

    Ok(PairedRows {
        rows: left.into_iter().zip(right).collect(),
        mismatch,
    })
}

impl Resolver {
    /// Text of the first visible match, or `None` when absent.
    ///
    /// A stale read re-resolves and reads exactly once more; if that also
    /// fails the result is `None`.
    pub async fn read_text(
        &self,
        scope: &Scope,
        expressions: &ExpressionList,
        trim: bool,
    ) -> Result<Option<String>, LocatorError> {
        let Some(handle) = self.resolve_optional(scope, expressions).await? else {
            return Ok(None);
        };

        let text = match self.engine().text_content(&handle.element).await {
            Ok(text) => text,
            Err(err) if err.is_stale() => {
                debug!("{} went stale before read, re-resolving once", handle.element);
                self.retry_read_text(scope, expressions).await
            }
            Err(err) => return Err(err.into()),
        };

        Ok(text.map(|t| if trim { t.trim().to_string() } else { t }))
    }

    async fn retry_read_text(&self, scope: &Scope, expressions: &ExpressionList) -> Option<String> {
        let handle = match self.resolve_optional(scope, expressions).await {
            Ok(Some(handle)) => handle,
            Ok(None) => return None,
            Err(err) => {
                debug!("Re-resolve after stale read failed: {}", err);
                return None;
            }
        };
        match self.engine().text_content(&handle.element).await {
            Ok(text) => text,
            Err(err) => {
                debug!("Retry read failed for {}: {}", handle.element, err);
                None
            }
        }
    }

    /// Text of every element matching any expression, in document order.
    /// A failed read fails the whole call.
    pub async fn read_texts(
        &self,
        scope: &Scope,
        expressions: &ExpressionList,
        trim: bool,
    ) -> Result<Vec<String>, LocatorError> {
        self.resolve_collection(scope, expressions).texts(trim).await
    }

    /// Read two row-aligned columns concurrently and zip them.
    pub async fn read_columns(
        &self,
        context: &str,
        scope: &Scope,
        left: &ExpressionList,
        right: &ExpressionList,
        policy: ColumnPolicy,
    ) -> Result<PairedRows, LocatorError> {
        let (left, right) = tokio::try_join!(
            self.read_texts(scope, left, true),
            self.read_texts(scope, right, true)
        )?;
        zip_columns(context, left, right, policy)
    }

    /// Leading integer of the first visible match; 0 when absent or
    /// unparsable.
    pub async fn read_count(
        &self,
        scope: &Scope,
        expressions: &ExpressionList,
    ) -> Result<u32, LocatorError> {
        let Some(text) = self.read_text(scope, expressions, true).await? else {
            return Ok(0);
        };
        Ok(parse_leading_count(&text))
    }
}

fn parse_leading_count(text: &str) -> u32 {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
