#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint for the Chenguang dev server.

use anyhow::Context;
use chenguang_devserver::{Cli, DevServerConfig, run_devserver};
use clap::Parser;

/// Layer configuration sources and serve until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config =
        DevServerConfig::load(cli.config.as_deref()).context("loading dev server configuration")?;
    config
        .apply_env(|name| std::env::var(name).ok())
        .context("applying environment overrides")?;
    config.apply_cli(cli.overrides());
    run_devserver(config).await?;
    Ok(())
}
