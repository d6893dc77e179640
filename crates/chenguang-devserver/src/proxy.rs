//! Path-prefix forwarding to backend origins.
//!
//! # Design
//! - A rule matches any request path that begins with its prefix; no path rewriting.
//! - The upstream URL is `target origin + target base path + request path + query`.
//! - Paths with `.` or `..` segments are refused with `400`: URL resolution would collapse
//!   them and the upstream would see a different path, possibly outside the matched prefix.
//! - Hop-by-hop headers are dropped in both directions; `Host` is rewritten only when the
//!   rule asks for origin rewriting.
//! - No retries and no timeouts: an unreachable upstream becomes a single `502`.

use std::sync::Arc;

use axum::{
    Json,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use chenguang_api_models::ApiErrorBody;
use reqwest::{Client, Url, redirect};
use tracing::{debug, warn};

use crate::config::{ConfigError, ProxyRule};
use crate::error::{DevResult, DevServerError};

/// Largest request body buffered for forwarding.
const MAX_FORWARD_BODY_BYTES: usize = 64 * 1024 * 1024;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// A validated forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    prefix: String,
    target: Url,
    change_origin: bool,
}

impl ProxyRoute {
    /// Validate a configured rule.
    ///
    /// # Errors
    ///
    /// Returns the validation error for malformed prefixes or targets.
    pub fn from_rule(rule: &ProxyRule) -> Result<Self, ConfigError> {
        Ok(Self {
            prefix: rule.prefix.clone(),
            target: rule.parsed_target()?,
            change_origin: rule.change_origin,
        })
    }

    /// Path prefix this route claims.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a request path is forwarded by this route.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Build the upstream URL for an incoming request URI.
    ///
    /// Returns `None` when the path holds dot segments, which cannot be forwarded verbatim.
    #[must_use]
    pub fn upstream_url(&self, uri: &Uri) -> Option<Url> {
        if has_dot_segment(uri.path()) {
            return None;
        }
        let mut url = self.target.clone();
        let base = self.target.path().trim_end_matches('/');
        url.set_path(&format!("{base}{}", uri.path()));
        url.set_query(uri.query());
        Some(url)
    }

    /// Authority (`host[:port]`) of the target, as sent in a rewritten `Host` header.
    #[must_use]
    pub fn target_authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        match self.target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

/// Ordered set of forwarding routes sharing one upstream client.
#[derive(Clone)]
pub struct ProxyTable {
    routes: Arc<[ProxyRoute]>,
    client: Client,
}

impl ProxyTable {
    /// Build the table from configured rules, longest prefix first.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule is invalid or the HTTP client cannot be built.
    pub fn new(rules: &[ProxyRule]) -> DevResult<Self> {
        let mut routes = rules
            .iter()
            .map(ProxyRoute::from_rule)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| DevServerError::config("proxy.rules", err))?;
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|source| DevServerError::HttpClient { source })?;
        Ok(Self {
            routes: routes.into(),
            client,
        })
    }

    /// Routes in evaluation order.
    #[must_use]
    pub fn routes(&self) -> &[ProxyRoute] {
        &self.routes
    }

    /// First route claiming `path`, if any.
    #[must_use]
    pub fn route_for(&self, path: &str) -> Option<&ProxyRoute> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Forward a request through `route` and relay the upstream response.
    pub async fn forward(&self, route: &ProxyRoute, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let Some(url) = route.upstream_url(&parts.uri) else {
            warn!(method = %parts.method, path = %parts.uri.path(), "refusing dot-segment path");
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("path {} contains dot segments", parts.uri.path()),
            );
        };
        let body = match to_bytes(body, MAX_FORWARD_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, upstream = %url, "request body could not be buffered");
                return error_response(StatusCode::PAYLOAD_TOO_LARGE, err.to_string());
            }
        };

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        if route.change_origin {
            headers.remove(header::HOST);
        }

        let upstream = self
            .client
            .request(parts.method.clone(), url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await;

        match upstream {
            Ok(response) => {
                debug!(
                    method = %parts.method,
                    upstream = %url,
                    status = response.status().as_u16(),
                    "proxied request"
                );
                relay(response)
            }
            Err(err) => {
                warn!(method = %parts.method, upstream = %url, error = %err, "upstream request failed");
                error_response(
                    StatusCode::BAD_GATEWAY,
                    format!("upstream {} unreachable: {err}", route.target_authority()),
                )
            }
        }
    }
}

fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Whether any segment is `.` or `..`, spelled literally or with `%2e`.
fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let lowered = segment.to_ascii_lowercase();
        let decoded = lowered.replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(ApiErrorBody::new(detail))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn rule(prefix: &str, target: &str) -> ProxyRule {
        ProxyRule {
            prefix: prefix.to_string(),
            target: target.to_string(),
            change_origin: true,
        }
    }

    #[test]
    fn prefix_match_follows_plain_starts_with() -> Result<(), Box<dyn Error>> {
        let route = ProxyRoute::from_rule(&rule("/api", "http://localhost:8000"))?;
        assert!(route.matches("/api"));
        assert!(route.matches("/api/health"));
        assert!(route.matches("/apix"));
        assert!(!route.matches("/status"));
        assert!(!route.matches("/"));
        Ok(())
    }

    #[test]
    fn upstream_url_keeps_path_and_query() -> Result<(), Box<dyn Error>> {
        let route = ProxyRoute::from_rule(&rule("/api", "http://localhost:8000"))?;
        let uri: Uri = "/api/memories/c-1?limit=20".parse()?;
        let url = route.upstream_url(&uri).ok_or("expected url")?;
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/memories/c-1?limit=20"
        );
        Ok(())
    }

    #[test]
    fn upstream_url_prepends_target_base_path() -> Result<(), Box<dyn Error>> {
        let route = ProxyRoute::from_rule(&rule("/api", "https://backend.internal/v1/"))?;
        let uri: Uri = "/api/health".parse()?;
        let url = route.upstream_url(&uri).ok_or("expected url")?;
        assert_eq!(url.as_str(), "https://backend.internal/v1/api/health");
        assert_eq!(route.target_authority(), "backend.internal");
        Ok(())
    }

    #[test]
    fn dot_segments_have_no_upstream_url() -> Result<(), Box<dyn Error>> {
        let route = ProxyRoute::from_rule(&rule("/api", "http://localhost:8000"))?;
        for path in [
            "/api/a/../health",
            "/api/%2e%2e/secret",
            "/api/%2E./secret",
            "/api/x/./y",
            "/api/x/%2e/y",
            "/api/..",
        ] {
            let uri: Uri = path.parse()?;
            assert_eq!(route.upstream_url(&uri), None, "{path}");
        }
        Ok(())
    }

    #[test]
    fn dotted_names_are_not_dot_segments() {
        assert!(!has_dot_segment("/api/files/report.v2.json"));
        assert!(!has_dot_segment("/api/.well-known/x"));
        assert!(!has_dot_segment("/api/..."));
        assert!(!has_dot_segment("/api/a%2eb"));
        assert!(has_dot_segment("/api/a/../b"));
    }

    #[test]
    fn table_prefers_longest_prefix() -> Result<(), Box<dyn Error>> {
        let table = ProxyTable::new(&[
            rule("/api", "http://localhost:8000"),
            rule("/api/upload", "http://localhost:9000"),
        ])?;
        let route = table.route_for("/api/upload").ok_or("expected route")?;
        assert_eq!(route.target_authority(), "localhost:9000");
        let route = table.route_for("/api/chat").ok_or("expected route")?;
        assert_eq!(route.target_authority(), "localhost:8000");
        assert!(table.route_for("/index.html").is_none());
        Ok(())
    }

    #[test]
    fn table_rejects_invalid_rules() {
        let result = ProxyTable::new(&[rule("api", "http://localhost:8000")]);
        assert!(matches!(result, Err(DevServerError::Config { .. })));
    }

    #[test]
    fn hop_by_hop_headers_are_stripped() -> Result<(), Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "keep-alive".parse()?);
        headers.insert("keep-alive", "timeout=5".parse()?);
        headers.insert(header::CONTENT_TYPE, "application/json".parse()?);
        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
        Ok(())
    }
}
