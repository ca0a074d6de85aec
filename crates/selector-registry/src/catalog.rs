//! Product catalog and per-product selectors

use locator_core::ExpressionList;
use serde::{Deserialize, Serialize};

pub const GENERIC_ADD_BUTTON: &str = ".btn.btn_primary.btn_small.btn_inventory";
pub const GENERIC_REMOVE_BUTTON: &str = ".btn.btn_secondary.btn_small.btn_inventory";
pub const GENERIC_IMAGE: &str = ".inventory_item_img";

/// Catalog entry for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMeta {
    /// Literal data-test suffix rendered by the storefront
    pub slug: String,
    pub display_name: String,
    pub price: String,
    #[serde(default)]
    pub description: String,
}

/// Selectors and human-readable fields derived from a [`ProductMeta`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSelectors {
    pub add_to_cart: ExpressionList,
    pub remove_from_cart: ExpressionList,
    pub image: ExpressionList,
    pub display_name: String,
    pub price: String,
    pub description: String,
}

impl ProductSelectors {
    /// Specific data-test selector first, generic class fallback second
    pub fn derive(meta: &ProductMeta) -> Self {
        Self {
            add_to_cart: pair(
                format!(r#"button[data-test="add-to-cart-{}"]"#, meta.slug),
                GENERIC_ADD_BUTTON,
            ),
            remove_from_cart: pair(
                format!(r#"button[data-test="remove-{}"]"#, meta.slug),
                GENERIC_REMOVE_BUTTON,
            ),
            image: pair(
                format!(r#"img[data-test="inventory-item-{}-img"]"#, meta.slug),
                GENERIC_IMAGE,
            ),
            display_name: meta.display_name.clone(),
            price: meta.price.clone(),
            description: meta.description.clone(),
        }
    }

    /// Look up a derived selector list by field name
    pub fn field(&self, name: &str) -> Option<&ExpressionList> {
        match name {
            "add_to_cart" => Some(&self.add_to_cart),
            "remove_from_cart" => Some(&self.remove_from_cart),
            "image" => Some(&self.image),
            _ => None,
        }
    }
}

impl From<&ProductMeta> for ProductSelectors {
    fn from(meta: &ProductMeta) -> Self {
        Self::derive(meta)
    }
}

fn pair(specific: String, generic: &str) -> ExpressionList {
    ExpressionList::single(specific).with_fallback(generic)
}
