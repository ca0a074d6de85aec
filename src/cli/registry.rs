use anyhow::{bail, Result};
use clap::Args;
use locator_core::{union_query, CombinedExpression};
use selector_registry::{slugify_item_name, ProductSelectors, SelectorRegistry};
use serde::Serialize;

use super::context::CliContext;
use super::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct SelectorsArgs {
    /// Only list entries of this group
    #[arg(short, long)]
    pub group: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct UnionArgs {
    /// Registry keys (group.element) or raw expressions
    #[arg(required = true, value_name = "KEY|EXPR")]
    pub items: Vec<String>,
}

#[derive(Args, Clone, Debug)]
pub struct ProductArgs {
    /// Catalog key (e.g. backpack) or display name
    pub key: String,
}

#[derive(Args, Clone, Debug)]
pub struct SlugArgs {
    /// Item name as displayed on the page
    pub name: String,
}

#[derive(Debug, Serialize)]
struct EntryView<'a> {
    key: String,
    expressions: &'a [String],
}

#[derive(Debug, Serialize)]
struct UnionView<'a> {
    members: &'a [String],
    combined: &'a str,
}

#[derive(Debug, Serialize)]
struct ProductView<'a> {
    key: &'a str,
    slug: &'a str,
    #[serde(flatten)]
    selectors: ProductSelectors,
}

#[derive(Debug, Serialize)]
struct SlugView<'a> {
    name: &'a str,
    slug: String,
}

pub fn cmd_selectors(args: SelectorsArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let registry = ctx.registry();
    let entries: Vec<EntryView<'_>> = match &args.group {
        Some(group) => registry
            .group(group)?
            .iter()
            .map(|(name, expressions)| EntryView {
                key: format!("{}.{}", group, name),
                expressions: expressions.as_slice(),
            })
            .collect(),
        None => registry
            .entries()
            .map(|(key, expressions)| EntryView {
                key,
                expressions: expressions.as_slice(),
            })
            .collect(),
    };

    output.emit(&entries, |entries| {
        for entry in entries {
            println!("{}", entry.key);
            for (idx, expression) in entry.expressions.iter().enumerate() {
                println!("  {}. {}", idx + 1, expression);
            }
        }
    })
}

/// Registry keys expand to their expression lists; anything else is taken
/// as a raw expression.
pub fn expand_union_items(registry: &SelectorRegistry, items: &[String]) -> CombinedExpression {
    let expanded = items.iter().flat_map(|item| match registry.get(item) {
        Ok(expressions) => expressions.to_vec(),
        Err(_) => vec![item.clone()],
    });
    union_query(expanded)
}

pub fn cmd_union(args: UnionArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let combined = expand_union_items(ctx.registry(), &args.items);
    if combined.is_empty() {
        bail!("No non-empty expressions given");
    }
    let view = UnionView {
        members: combined.members(),
        combined: combined.as_str(),
    };
    output.emit(&view, |view| println!("{}", view.combined))
}

pub fn cmd_product(args: ProductArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let registry = ctx.registry();
    let (key, meta) = match registry.product_meta(&args.key) {
        Ok(meta) => (args.key.as_str(), meta),
        Err(err) => match registry.product_by_name(&args.key) {
            Some(found) => found,
            None => return Err(err.into()),
        },
    };

    let view = ProductView {
        key,
        slug: &meta.slug,
        selectors: ProductSelectors::derive(meta),
    };
    output.emit(&view, |view| {
        println!("{} ({})", view.selectors.display_name, view.key);
        println!("  slug:             {}", view.slug);
        println!("  price:            {}", view.selectors.price);
        println!("  add_to_cart:      {}", view.selectors.add_to_cart);
        println!("  remove_from_cart: {}", view.selectors.remove_from_cart);
        println!("  image:            {}", view.selectors.image);
    })
}

pub fn cmd_slug(args: SlugArgs, output: OutputFormat) -> Result<()> {
    let view = SlugView {
        name: &args.name,
        slug: slugify_item_name(&args.name),
    };
    output.emit(&view, |view| println!("{}", view.slug))
}
