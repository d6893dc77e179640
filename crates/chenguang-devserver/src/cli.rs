//! Command-line surface of the dev server binary.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::CliOverrides;

/// Environment variable naming the YAML configuration file.
pub const ENV_CONFIG: &str = "CHENGUANG_DEV_CONFIG";

/// Serve the Chenguang web client with `/api` forwarded to the backend.
#[derive(Debug, Parser)]
#[command(
    name = "chenguang-devserver",
    about = "Development server for the Chenguang web client"
)]
pub struct Cli {
    /// YAML configuration file layered over the defaults.
    #[arg(long, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
    /// Interface to bind.
    #[arg(long)]
    pub host: Option<IpAddr>,
    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,
    /// Directory holding the built client.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
    /// Origin that `/api` requests are forwarded to.
    #[arg(long)]
    pub backend: Option<String>,
}

impl Cli {
    /// Split the flags into the overrides applied after file and environment layers.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host,
            port: self.port,
            static_dir: self.static_dir.clone(),
            backend: self.backend.clone(),
        }
    }
}
