//! Static hosting and SPA history fallback.

use std::error::Error;
use std::fs;
use std::path::Path;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chenguang_devserver::{DevServer, DevServerConfig};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn Error>>;

const INDEX: &str = "<!doctype html><html><body><div id=\"app\"></div></body></html>";

fn router_for(dir: &Path) -> Result<Router, Box<dyn Error>> {
    let config = DevServerConfig {
        static_dir: dir.to_path_buf(),
        ..DevServerConfig::default()
    };
    Ok(DevServer::new(&config)?.into_router())
}

fn bundle() -> Result<tempfile::TempDir, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("index.html"), INDEX)?;
    fs::create_dir(dir.path().join("assets"))?;
    fs::write(dir.path().join("assets").join("app.js"), "console.log('晨光');")?;
    Ok(dir)
}

async fn get(router: Router, uri: &str) -> Result<(StatusCode, String, Option<String>), Box<dyn Error>> {
    let request = Request::builder().uri(uri).body(Body::empty())?;
    let response = router.oneshot(request).await?;
    let status = response.status();
    let cache = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(bytes.to_vec())?, cache))
}

#[tokio::test]
async fn client_routes_fall_back_to_index_with_reload_script() -> TestResult {
    let dir = bundle()?;
    let router = router_for(dir.path())?;

    for uri in ["/", "/status", "/does-not-exist"] {
        let (status, body, cache) = get(router.clone(), uri).await?;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains("<div id=\"app\"></div>"));
        assert!(body.contains("data-chenguang-livereload"));
        assert_eq!(cache.as_deref(), Some("no-cache"));
    }
    Ok(())
}

#[tokio::test]
async fn assets_are_served_verbatim() -> TestResult {
    let dir = bundle()?;
    let (status, body, _) = get(router_for(dir.path())?, "/assets/app.js").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log('晨光');");
    Ok(())
}

#[tokio::test]
async fn missing_assets_are_not_found() -> TestResult {
    let dir = bundle()?;
    let (status, _, _) = get(router_for(dir.path())?, "/chenguang_ui_bg.wasm").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn missing_index_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (status, body, _) = get(router_for(dir.path())?, "/status").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("index.html"));
    Ok(())
}

#[tokio::test]
async fn writes_outside_the_proxy_are_rejected() -> TestResult {
    let dir = bundle()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/status")
        .body(Body::empty())?;
    let response = router_for(dir.path())?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
