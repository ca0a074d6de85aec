use clap::Subcommand;

use super::probe::ProbeArgs;
use super::registry::{ProductArgs, SelectorsArgs, SlugArgs, UnionArgs};

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// List registry entries
    Selectors(SelectorsArgs),

    /// Print the combined expression for registry keys or raw expressions
    Union(UnionArgs),

    /// Print the selectors derived for a catalog product
    Product(ProductArgs),

    /// Convert an item name to its data-test slug
    Slug(SlugArgs),

    /// Open a page and resolve a registry entry against it
    Probe(ProbeArgs),

    /// Show version, build and configuration information
    Info,
}
