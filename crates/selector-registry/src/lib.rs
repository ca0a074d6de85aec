//! Storefront selector registry
//!
//! Named fallback selector lists grouped by page, the product catalog, and
//! the per-product selectors derived from it.

pub mod catalog;
pub mod registry;
pub mod slug;

pub use catalog::{ProductMeta, ProductSelectors};
pub use registry::{RegistryError, SelectorFile, SelectorGroup, SelectorRegistry};
pub use slug::slugify_item_name;
