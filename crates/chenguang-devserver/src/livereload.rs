//! Live reload for the built client.
//!
//! # Design
//! - A background task polls a [`DirSnapshot`] of the static directory on the blocking pool
//!   and broadcasts a reload signal whenever it differs from the last one. Counting files
//!   makes deletions visible even when the newest modification time stays put.
//! - Browsers connect to [`LIVERELOAD_PATH`] through a script injected into `index.html`.
//! - Behind a TLS front door the browser must dial the public port (`hmr.client_port`), not the
//!   port the dev server listens on.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Websocket endpoint the injected client connects to.
pub const LIVERELOAD_PATH: &str = "/__livereload";
/// Message sent to browsers when assets change.
pub const RELOAD_MESSAGE: &str = "reload";

const CLIENT_PORT_PLACEHOLDER: &str = "__CLIENT_PORT__";
const CLIENT_SCRIPT_TEMPLATE: &str = r#"<script data-chenguang-livereload>
(() => {
  const secure = location.protocol === "https:";
  const port = secure && __CLIENT_PORT__ ? __CLIENT_PORT__ : location.port;
  const origin = `${secure ? "wss" : "ws"}://${location.hostname}${port ? ":" + port : ""}`;
  const socket = new WebSocket(`${origin}/__livereload`);
  socket.addEventListener("message", (event) => {
    if (event.data === "reload") location.reload();
  });
})();
</script>"#;

/// Broadcast hub for reload notifications.
#[derive(Clone)]
pub struct LiveReload {
    sender: broadcast::Sender<()>,
    client_port: Option<u16>,
}

impl LiveReload {
    /// Create a hub; `client_port` is the public port used behind TLS.
    #[must_use]
    pub fn new(client_port: Option<u16>) -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            sender,
            client_port,
        }
    }

    /// Subscribe to reload notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Notify every connected browser; returns how many were reached.
    pub fn notify(&self) -> usize {
        self.sender.send(()).unwrap_or(0)
    }

    /// Browser script that connects to the reload socket.
    #[must_use]
    pub fn client_script(&self) -> String {
        let port = self
            .client_port
            .map_or_else(|| "null".to_string(), |port| port.to_string());
        CLIENT_SCRIPT_TEMPLATE.replace(CLIENT_PORT_PLACEHOLDER, &port)
    }

    /// Insert the client script before `</body>`, or append it when the tag is missing.
    #[must_use]
    pub fn inject(&self, html: &str) -> String {
        let script = self.client_script();
        match html.rfind("</body>") {
            Some(index) => {
                let mut out = String::with_capacity(html.len() + script.len());
                out.push_str(&html[..index]);
                out.push_str(&script);
                out.push_str(&html[index..]);
                out
            }
            None => format!("{html}{script}"),
        }
    }

    /// Forward reload notifications to one websocket until either side goes away.
    pub async fn serve_socket(self, mut socket: WebSocket) {
        let mut receiver = self.subscribe();
        loop {
            tokio::select! {
                signal = receiver.recv() => {
                    match signal {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            if socket.send(Message::Text(RELOAD_MESSAGE.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                incoming = socket.recv() => {
                    match incoming {
                        Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
        debug!("live reload client disconnected");
    }

    /// Spawn the polling task watching `dir`.
    #[must_use]
    pub fn spawn_watcher(&self, dir: PathBuf, interval: Duration) -> JoinHandle<()> {
        let hub = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_seen = scan(&dir).await.unwrap_or_default();
            loop {
                ticker.tick().await;
                let Some(current) = scan(&dir).await else {
                    continue;
                };
                if current != last_seen {
                    let reached = hub.notify();
                    info!(
                        dir = %dir.display(),
                        files = current.files,
                        clients = reached,
                        "static assets changed; reloading"
                    );
                    last_seen = current;
                }
            }
        })
    }
}

/// File count and newest modification time under a directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirSnapshot {
    /// Regular files found.
    pub files: usize,
    /// Newest modification time among them.
    pub newest: Option<SystemTime>,
}

impl DirSnapshot {
    /// Walk `dir`; unreadable entries are skipped and a missing directory is empty.
    #[must_use]
    pub fn capture(dir: &Path) -> Self {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .fold(Self::default(), |snapshot, entry| {
                let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
                Self {
                    files: snapshot.files + 1,
                    newest: snapshot.newest.max(modified),
                }
            })
    }
}

async fn scan(dir: &Path) -> Option<DirSnapshot> {
    let owned = dir.to_path_buf();
    match tokio::task::spawn_blocking(move || DirSnapshot::capture(&owned)).await {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "static directory scan failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;

    #[test]
    fn script_embeds_client_port() {
        let script = LiveReload::new(Some(443)).client_script();
        assert!(script.contains("secure && 443 ? 443"));
        assert!(script.contains(LIVERELOAD_PATH));

        let local = LiveReload::new(None).client_script();
        assert!(local.contains("secure && null ? null"));
        assert!(!local.contains(CLIENT_PORT_PLACEHOLDER));
    }

    #[test]
    fn inject_places_script_before_body_close() {
        let hub = LiveReload::new(Some(443));
        let html = "<html><body><div id=\"app\"></div></body></html>";
        let injected = hub.inject(html);
        let script_at = injected.find("<script data-chenguang-livereload>");
        let body_close = injected.find("</body>");
        assert!(script_at.is_some());
        assert!(script_at < body_close);
        assert!(injected.starts_with("<html><body><div id=\"app\"></div>"));
    }

    #[test]
    fn inject_appends_without_body_tag() {
        let hub = LiveReload::new(None);
        let injected = hub.inject("<p>fragment</p>");
        assert!(injected.starts_with("<p>fragment</p><script"));
    }

    #[test]
    fn notify_without_clients_reaches_nobody() {
        let hub = LiveReload::new(None);
        assert_eq!(hub.notify(), 0);
        let mut receiver = hub.subscribe();
        assert_eq!(hub.notify(), 1);
        assert!(receiver.try_recv().is_ok());
    }

    #[test]
    fn snapshot_counts_files_and_tracks_newest() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        assert_eq!(DirSnapshot::capture(dir.path()), DirSnapshot::default());
        fs::create_dir(dir.path().join("assets"))?;
        fs::write(dir.path().join("assets").join("app.js"), "console.log(1)")?;
        fs::write(dir.path().join("index.html"), "<html></html>")?;
        let snapshot = DirSnapshot::capture(dir.path());
        assert_eq!(snapshot.files, 2);
        assert!(snapshot.newest.is_some());
        assert_eq!(
            DirSnapshot::capture(&dir.path().join("missing")),
            DirSnapshot::default()
        );
        Ok(())
    }

    #[tokio::test]
    async fn watcher_broadcasts_on_change() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("index.html"), "<html></html>")?;
        let hub = LiveReload::new(None);
        let mut receiver = hub.subscribe();
        let handle = hub.spawn_watcher(dir.path().to_path_buf(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(60)).await;
        let later = SystemTime::now() + Duration::from_secs(5);
        let file = fs::File::options()
            .write(true)
            .open(dir.path().join("index.html"))?;
        file.set_modified(later)?;

        let signal = tokio::time::timeout(Duration::from_secs(2), receiver.recv()).await?;
        assert!(signal.is_ok());
        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn watcher_broadcasts_on_deletion() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let stale = dir.path().join("stale.js");
        fs::write(&stale, "old")?;
        let index = fs::File::create(dir.path().join("index.html"))?;
        index.set_modified(SystemTime::now() + Duration::from_secs(5))?;
        let hub = LiveReload::new(None);
        let mut receiver = hub.subscribe();
        let handle = hub.spawn_watcher(dir.path().to_path_buf(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(60)).await;
        fs::remove_file(&stale)?;

        let signal = tokio::time::timeout(Duration::from_secs(2), receiver.recv()).await?;
        assert!(signal.is_ok());
        handle.abort();
        Ok(())
    }
}
