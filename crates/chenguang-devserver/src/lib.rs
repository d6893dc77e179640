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

//! Development server for the Chenguang web client.
//!
//! Layout: `config.rs` (layered settings), `proxy.rs` (`/api` forwarding), `livereload.rs`
//! (reload socket and watcher), `server.rs` (router), `bootstrap.rs` (boot sequence).

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod livereload;
pub mod proxy;
pub mod server;

pub use bootstrap::run_devserver;
pub use cli::Cli;
pub use config::{CliOverrides, ConfigError, DevServerConfig, HmrConfig, LogSettings, ProxyRule};
pub use error::{DevResult, DevServerError};
pub use livereload::{DirSnapshot, LIVERELOAD_PATH, LiveReload};
pub use proxy::{ProxyRoute, ProxyTable};
pub use server::DevServer;
