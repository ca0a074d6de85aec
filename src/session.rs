//! Registry-keyed facade over the resolver
//!
//! Page objects address elements by registry key (`cart.cart_item`) rather
//! than by raw expression lists. The session owns nothing mutable: the
//! registry is frozen behind an `Arc` and every call re-resolves.

use std::sync::Arc;

use locator_core::{
    CollectionHandle, ColumnPolicy, ElementRef, ExpressionList, Handle, PairedRows,
    ResolveOptions, Resolver, Scope,
};
use selector_registry::SelectorRegistry;
use tracing::info;

use crate::errors::{ProbeError, ProbeResult};

#[derive(Clone)]
pub struct ProbeSession {
    resolver: Resolver,
    registry: Arc<SelectorRegistry>,
    column_policy: ColumnPolicy,
}

impl ProbeSession {
    pub fn new(resolver: Resolver, registry: Arc<SelectorRegistry>) -> Self {
        Self {
            resolver,
            registry,
            column_policy: ColumnPolicy::default(),
        }
    }

    pub fn with_column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.column_policy = policy;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn registry(&self) -> &Arc<SelectorRegistry> {
        &self.registry
    }

    pub fn column_policy(&self) -> ColumnPolicy {
        self.column_policy
    }

    pub fn expressions(&self, key: &str) -> ProbeResult<&ExpressionList> {
        Ok(self.registry.get(key)?)
    }

    pub async fn find(&self, key: &str, options: ResolveOptions) -> ProbeResult<Handle> {
        self.find_in(&Scope::Document, key, options).await
    }

    pub async fn find_in(
        &self,
        scope: &Scope,
        key: &str,
        options: ResolveOptions,
    ) -> ProbeResult<Handle> {
        let expressions = self.expressions(key)?;
        let handle = self
            .resolver
            .resolve_required(scope, expressions, options)
            .await?;
        info!(
            "{} resolved via '{}' (#{})",
            key, handle.expression, handle.expression_index
        );
        Ok(handle)
    }

    pub async fn find_optional(&self, key: &str) -> ProbeResult<Option<Handle>> {
        let expressions = self.expressions(key)?;
        Ok(self
            .resolver
            .resolve_optional(&Scope::Document, expressions)
            .await?)
    }

    pub fn collection(&self, key: &str) -> ProbeResult<CollectionHandle> {
        self.collection_in(&Scope::Document, key)
    }

    pub fn collection_in(&self, scope: &Scope, key: &str) -> ProbeResult<CollectionHandle> {
        let expressions = self.expressions(key)?;
        Ok(self.resolver.resolve_collection(scope, expressions))
    }

    pub async fn text(&self, key: &str, trim: bool) -> ProbeResult<Option<String>> {
        let expressions = self.expressions(key)?;
        Ok(self
            .resolver
            .read_text(&Scope::Document, expressions, trim)
            .await?)
    }

    pub async fn texts(&self, key: &str, trim: bool) -> ProbeResult<Vec<String>> {
        let expressions = self.expressions(key)?;
        Ok(self
            .resolver
            .read_texts(&Scope::Document, expressions, trim)
            .await?)
    }

    pub async fn count(&self, key: &str) -> ProbeResult<u32> {
        let expressions = self.expressions(key)?;
        Ok(self
            .resolver
            .read_count(&Scope::Document, expressions)
            .await?)
    }

    /// Paired columns read inside each row matched by `rows_key`, under the
    /// session's column policy.
    pub async fn columns(
        &self,
        rows_key: &str,
        left_key: &str,
        right_key: &str,
    ) -> ProbeResult<PairedRows> {
        let rows = self.collection(rows_key)?.as_scope();
        let left = self.expressions(left_key)?;
        let right = self.expressions(right_key)?;
        let context = format!("{} ({} / {})", rows_key, left_key, right_key);
        Ok(self
            .resolver
            .read_columns(&context, &rows, left, right, self.column_policy)
            .await?)
    }

    /// First product card whose text contains `display_name`
    pub async fn product_card(&self, display_name: &str) -> ProbeResult<Option<ElementRef>> {
        Ok(self
            .collection("products.item")?
            .filter_has_text(display_name)
            .first()
            .await?)
    }

    /// Resolve a derived product selector (`add_to_cart`, `remove_from_cart`,
    /// `image`). Buttons must be interactable.
    pub async fn product_element(&self, product: &str, field: &str) -> ProbeResult<Handle> {
        let selectors = self.registry.product(product)?;
        let expressions = selectors
            .field(field)
            .ok_or_else(|| ProbeError::UnknownProductField {
                product: product.to_string(),
                field: field.to_string(),
            })?;
        let options = if field == "image" {
            ResolveOptions::default()
        } else {
            ResolveOptions::interactive()
        };
        Ok(self
            .resolver
            .resolve_required(&Scope::Document, expressions, options)
            .await?)
    }
}
