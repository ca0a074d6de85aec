//! Item name to data-test slug conversion

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Kebab-case slug for an item name.
///
/// `"Sauce Labs Backpack"` becomes `"sauce-labs-backpack"`. Punctuation is
/// dropped rather than replaced, so `"Test.allTheThings() T-Shirt (Red)"`
/// becomes `"testallthethings-t-shirt-red"`. That differs from the literal
/// slug the storefront uses for that product, which is why the catalog stores
/// slugs instead of deriving them.
pub fn slugify_item_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let dashed = WHITESPACE.replace_all(&stripped, "-");
    DASHES.replace_all(&dashed, "-").into_owned()
}
