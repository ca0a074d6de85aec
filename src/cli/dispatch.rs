use super::env::CliArgs;
use super::info::cmd_info;
use super::probe::cmd_probe;
use super::registry::{cmd_product, cmd_selectors, cmd_slug, cmd_union};
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    let output = cli.output;
    match cli.command.clone() {
        Commands::Selectors(args) => cmd_selectors(args, ctx, output),
        Commands::Union(args) => cmd_union(args, ctx, output),
        Commands::Product(args) => cmd_product(args, ctx, output),
        Commands::Slug(args) => cmd_slug(args, output),
        Commands::Probe(args) => cmd_probe(args, ctx, output).await,
        Commands::Info => cmd_info(ctx, output),
    }
}
