use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    storefront_probe::cli::app::run().await
}
