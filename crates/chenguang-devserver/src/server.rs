//! Router construction and listener loop for the dev server.
//!
//! # Design
//! - Dispatch order: live reload socket, proxy rules, static assets, then the SPA history
//!   fallback serving `index.html` for extension-less paths.
//! - `index.html` is never cached so a rebuilt bundle is picked up on reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{Request, State, WebSocketUpgrade},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chenguang_telemetry::{build_sha, request_id_layers, request_id_of};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{Span, info, warn};

use crate::config::DevServerConfig;
use crate::error::{DevResult, DevServerError};
use crate::livereload::{LIVERELOAD_PATH, LiveReload};
use crate::proxy::{ProxyRoute, ProxyTable};

const INDEX_FILE: &str = "index.html";

struct DevState {
    proxy: ProxyTable,
    live: LiveReload,
    assets: ServeDir,
    static_dir: PathBuf,
}

/// Axum router wrapper hosting the client bundle and the backend proxy.
pub struct DevServer {
    router: Router,
    proxy: ProxyTable,
    live: LiveReload,
}

impl DevServer {
    /// Build the router for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a proxy rule is invalid or the upstream client cannot be built.
    pub fn new(config: &DevServerConfig) -> DevResult<Self> {
        let proxy = ProxyTable::new(&config.proxy)?;
        let live = LiveReload::new(config.hmr.client_port);
        let state = Arc::new(DevState {
            proxy: proxy.clone(),
            live: live.clone(),
            assets: ServeDir::new(&config.static_dir),
            static_dir: config.static_dir.clone(),
        });

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id_of(request),
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request, _span: &Span| {})
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status_code", response.status().as_u16());
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                span.record("latency_ms", latency_ms);
            });
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = Router::new()
            .route(LIVERELOAD_PATH, get(livereload_socket))
            .fallback(dispatch)
            .with_state(state)
            .layer(cors_layer)
            .layer(trace_layer)
            .layer(request_id_layers());

        Ok(Self {
            router,
            proxy,
            live,
        })
    }

    /// Proxy routes in evaluation order.
    #[must_use]
    pub fn routes(&self) -> &[ProxyRoute] {
        self.proxy.routes()
    }

    /// Live reload hub shared with the file watcher.
    #[must_use]
    pub const fn live_reload(&self) -> &LiveReload {
        &self.live
    }

    /// Consume the server and return its router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until the listener fails or the process receives Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the server terminates unexpectedly.
    pub async fn serve(self, listener: TcpListener) -> DevResult<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "dev server listening");
        }
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|source| DevServerError::Serve { source })
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn livereload_socket(
    State(state): State<Arc<DevState>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let live = state.live.clone();
    upgrade.on_upgrade(move |socket| live.serve_socket(socket))
}

async fn dispatch(State(state): State<Arc<DevState>>, request: Request) -> Response {
    if let Some(route) = state.proxy.route_for(request.uri().path()) {
        return state.proxy.forward(route, request).await;
    }
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }
    if wants_index(request.uri().path()) {
        return serve_index(&state).await;
    }
    match state.assets.clone().oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

/// Whether a path is a client-side route rather than an asset.
fn wants_index(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default();
    last.is_empty() || last == INDEX_FILE || !last.contains('.')
}

async fn serve_index(state: &DevState) -> Response {
    let path = state.static_dir.join(INDEX_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                ),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            ],
            state.live.inject(&html),
        )
            .into_response(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "index.html unavailable");
            (
                StatusCode::NOT_FOUND,
                "index.html not found; build the client into the static directory",
            )
                .into_response()
        }
    }
}
