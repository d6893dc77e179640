//! # Design
//!
//! - Centralize dev server errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for dev server operations.
pub type DevResult<T> = Result<T, DevServerError>;

/// Dev server error type.
#[derive(Debug, Error)]
pub enum DevServerError {
    /// Configuration loading or validation failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: chenguang_telemetry::TelemetryError,
    },
    /// Building the upstream HTTP client failed.
    #[error("failed to build upstream http client")]
    HttpClient {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// Binding the listener failed.
    #[error("failed to bind dev server listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Serving requests failed.
    #[error("dev server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl DevServerError {
    pub(crate) const fn config(operation: &'static str, source: ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: chenguang_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }
}
