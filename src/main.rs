//! Skylift CLI entry point.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    skylift_cli::run().await
}
