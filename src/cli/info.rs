use anyhow::Result;
use serde::Serialize;

use super::context::CliContext;
use super::output::OutputFormat;

#[derive(Debug, Serialize)]
struct InfoView<'a> {
    version: &'a str,
    build_date: &'a str,
    git_hash: &'a str,
    chromium_support: bool,
    config_path: String,
    config_found: bool,
    strict_columns: bool,
    selector_groups: Vec<&'a str>,
    selector_entries: usize,
    products: usize,
}

pub fn cmd_info(ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let registry = ctx.registry();
    let view = InfoView {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_hash: env!("GIT_HASH"),
        chromium_support: cfg!(feature = "chromium"),
        config_path: ctx.config_path().display().to_string(),
        config_found: ctx.config_found(),
        strict_columns: ctx.config().strict_columns,
        selector_groups: registry.group_names().collect(),
        selector_entries: registry.entries().count(),
        products: registry.product_keys().count(),
    };

    output.emit(&view, |view| {
        println!("storefront-probe Information");
        println!("============================");
        println!("Version: {}", view.version);
        println!("Build Date: {}", view.build_date);
        println!("Git Commit: {}", view.git_hash);
        println!(
            "Chromium Support: {}",
            if view.chromium_support { "enabled" } else { "disabled" }
        );
        println!();
        println!("Configuration:");
        println!(
            "- Config File: {}{}",
            view.config_path,
            if view.config_found { "" } else { " (not found, using defaults)" }
        );
        println!(
            "- Column Policy: {}",
            if view.strict_columns { "strict" } else { "lenient" }
        );
        println!();
        println!("Selector Registry:");
        println!("- Groups: {}", view.selector_groups.join(", "));
        println!("- Entries: {}", view.selector_entries);
        println!("- Products: {}", view.products);
    })
}
