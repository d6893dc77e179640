//! Dev server boot sequence.
//!
//! # Design
//! - Logging first, so every later failure is reported through the subscriber.
//! - The file watcher is aborted once the listener returns.

use std::net::SocketAddr;
use std::time::Duration;

use chenguang_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::DevServerConfig;
use crate::error::{DevResult, DevServerError};
use crate::server::DevServer;

/// Run the dev server until shutdown.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, the configuration is invalid, the
/// listener cannot bind, or serving fails.
pub async fn run_devserver(config: DevServerConfig) -> DevResult<()> {
    let logging = LoggingConfig {
        level: &config.log.level,
        format: config.log.format.unwrap_or_else(LogFormat::infer),
        ..LoggingConfig::default()
    };
    chenguang_telemetry::init_logging(&logging)
        .map_err(|err| DevServerError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("devserver");

    config
        .validate()
        .map_err(|err| DevServerError::config("config.validate", err))?;
    info!(
        static_dir = %config.static_dir.display(),
        hmr_client_port = ?config.hmr.client_port,
        "dev server bootstrap starting"
    );

    let server = DevServer::new(&config)?;
    for route in server.routes() {
        info!(prefix = route.prefix(), target = %route.target_authority(), "proxy route");
    }

    let addr = SocketAddr::new(config.host, config.port);
    let listener = bind(addr).await?;
    let watcher = server.live_reload().spawn_watcher(
        config.static_dir.clone(),
        Duration::from_millis(config.hmr.poll_interval_ms),
    );

    let served = server.serve(listener).await;
    watcher.abort();
    if let Err(err) = watcher.await
        && !err.is_cancelled()
    {
        warn!(error = %err, "live reload watcher join failed");
    }
    served?;
    info!("dev server shutdown complete");
    Ok(())
}

pub(crate) async fn bind(addr: SocketAddr) -> DevResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| DevServerError::Bind { addr, source })
}
