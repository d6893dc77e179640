//! Dev server configuration model and loader.
//!
//! # Design
//! - Defaults reproduce the frontend's historical dev setup: `0.0.0.0:5000`, `/api` forwarded
//!   to `http://localhost:8000` with origin rewriting, live-reload client port 443.
//! - Layering, later wins: defaults, optional YAML file, environment, CLI flags.
//! - Validation errors carry constant reasons plus the offending field and value.

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use chenguang_telemetry::LogFormat;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the bind host.
pub const ENV_HOST: &str = "CHENGUANG_DEV_HOST";
/// Environment variable overriding the bind port.
pub const ENV_PORT: &str = "CHENGUANG_DEV_PORT";
/// Environment variable overriding the static asset directory.
pub const ENV_STATIC_DIR: &str = "CHENGUANG_DEV_STATIC_DIR";
/// Environment variable overriding the `/api` backend origin.
pub const ENV_BACKEND: &str = "CHENGUANG_DEV_BACKEND";
/// Environment variable overriding the live-reload client port.
pub const ENV_HMR_CLIENT_PORT: &str = "CHENGUANG_DEV_HMR_CLIENT_PORT";

/// Prefix routed to the backend by default.
pub const DEFAULT_API_PREFIX: &str = "/api";
/// Backend origin used when nothing else is configured.
pub const DEFAULT_BACKEND: &str = "http://localhost:8000";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HMR_CLIENT_PORT: u16 = 443;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Errors raised while loading or validating dev server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The configuration file was not valid YAML for the model.
    #[error("failed to parse configuration file")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// A field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.into()),
            reason,
        }
    }
}

/// Complete dev server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevServerConfig {
    /// Interface the listener binds to.
    pub host: IpAddr,
    /// TCP port the listener binds to.
    pub port: u16,
    /// Directory holding the built client (`index.html`, wasm, assets).
    pub static_dir: PathBuf,
    /// Live-reload settings.
    pub hmr: HmrConfig,
    /// Forwarding rules, evaluated longest prefix first.
    pub proxy: Vec<ProxyRule>,
    /// Logging settings.
    pub log: LogSettings,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("dist"),
            hmr: HmrConfig::default(),
            proxy: vec![ProxyRule {
                prefix: DEFAULT_API_PREFIX.to_string(),
                target: DEFAULT_BACKEND.to_string(),
                change_origin: true,
            }],
            log: LogSettings::default(),
        }
    }
}

/// Live-reload client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HmrConfig {
    /// Port the browser should use for the reload socket when the page is
    /// served over https (a TLS front door); `None` means the page's own port.
    pub client_port: Option<u16>,
    /// How often the static directory is scanned for changes.
    pub poll_interval_ms: u64,
}

impl Default for HmrConfig {
    fn default() -> Self {
        Self {
            client_port: Some(DEFAULT_HMR_CLIENT_PORT),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// A single path-prefix forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyRule {
    /// Request path prefix, e.g. `/api`.
    pub prefix: String,
    /// Absolute origin the request is forwarded to.
    pub target: String,
    /// Rewrite the `Host` header to the target's authority.
    #[serde(default = "default_change_origin")]
    pub change_origin: bool,
}

/// Logging settings for the dev server process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format; inferred from the build profile when absent.
    pub format: Option<LogFormat>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: chenguang_telemetry::DEFAULT_LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// Bind host override.
    pub host: Option<IpAddr>,
    /// Bind port override.
    pub port: Option<u16>,
    /// Static directory override.
    pub static_dir: Option<PathBuf>,
    /// Backend origin override for the `/api` rule.
    pub backend: Option<String>,
}

impl DevServerConfig {
    /// Load configuration from an optional YAML file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a YAML document; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error when the document does not match the model.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error when an override cannot be parsed.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("host", host, "not_an_ip_address"))?;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("port", port, "not_a_port"))?;
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.set_backend(backend.trim());
        }
        if let Some(port) = lookup(ENV_HMR_CLIENT_PORT) {
            let trimmed = port.trim();
            self.hmr.client_port = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse().map_err(|_| {
                    ConfigError::invalid("hmr.client_port", port.clone(), "not_a_port")
                })?)
            };
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, overrides: CliOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = overrides.static_dir {
            self.static_dir = dir;
        }
        if let Some(backend) = overrides.backend {
            self.set_backend(&backend);
        }
    }

    /// Point the `/api` rule at `backend`, adding the rule if it is missing.
    pub fn set_backend(&mut self, backend: &str) {
        if let Some(rule) = self
            .proxy
            .iter_mut()
            .find(|rule| rule.prefix == DEFAULT_API_PREFIX)
        {
            backend.clone_into(&mut rule.target);
        } else {
            self.proxy.push(ProxyRule {
                prefix: DEFAULT_API_PREFIX.to_string(),
                target: backend.to_string(),
                change_origin: true,
            });
        }
    }

    /// Check the configuration for values the server cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "0", "zero"));
        }
        if self.hmr.poll_interval_ms == 0 {
            return Err(ConfigError::invalid("hmr.poll_interval_ms", "0", "zero"));
        }
        if self.hmr.client_port == Some(0) {
            return Err(ConfigError::invalid("hmr.client_port", "0", "zero"));
        }
        for rule in &self.proxy {
            rule.parsed_target()?;
        }
        Ok(())
    }
}

impl ProxyRule {
    /// Validate the rule and return its parsed target origin.
    ///
    /// # Errors
    ///
    /// Returns an error for prefixes without a leading slash and for targets that
    /// are not absolute `http`/`https` URLs.
    pub fn parsed_target(&self) -> Result<Url, ConfigError> {
        if !self.prefix.starts_with('/') {
            return Err(ConfigError::invalid(
                "proxy.prefix",
                self.prefix.clone(),
                "missing_leading_slash",
            ));
        }
        let url = Url::parse(&self.target)
            .map_err(|_| ConfigError::invalid("proxy.target", self.target.clone(), "not_a_url"))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::invalid(
                "proxy.target",
                self.target.clone(),
                "unsupported_scheme",
            ));
        }
        Ok(url)
    }
}

const fn default_change_origin() -> bool {
    true
}
