//! HTTP server for the output directory.
//!
//! Every request goes through one fallback handler:
//!
//! 1. WebSocket upgrade (development) → register a live-reload client
//! 2. [`SIGNAL_ROUTE`] (development, any method) → broadcast a reload
//! 3. existing file under the output directory → stream it
//! 4. last path segment contains `.` → 404
//! 5. anything else → `index.html` (client-side routing)
//!
//! Files are read from disk on every request, never cached, so a client
//! always gets the latest build.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{
        FromRequestParts, Request, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};

use crate::build::INDEX_FILE;
use crate::dev::registry::{ConnectionRegistry, SharedRegistry};
use crate::error::{CliError, Result};

/// Route the build subprocess calls after a successful rebuild.
pub const SIGNAL_ROUTE: &str = "/_bundler";

/// State shared by all request handlers.
#[derive(Debug)]
pub struct DevServerState {
    pub registry: SharedRegistry,
    pub out_dir: PathBuf,
    /// Enables the upgrade path and the signal route
    pub development: bool,
}

pub type SharedState = Arc<DevServerState>;

impl DevServerState {
    pub fn new(out_dir: impl Into<PathBuf>, development: bool) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            out_dir: out_dir.into(),
            development,
        }
    }
}

/// Development server bound to one output directory.
pub struct DevServer {
    listener: TcpListener,
    state: SharedState,
}

impl DevServer {
    /// Bind the listening socket. Serving starts with [`DevServer::run`].
    pub async fn bind(addr: SocketAddr, state: SharedState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process ends.
    pub async fn run(self) -> Result<()> {
        axum::serve(self.listener, build_router(self.state))
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

/// Build the router. Exposed for tests.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn handle_request(State(state): State<SharedState>, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();

    if state.development && wants_websocket(&parts.headers) {
        return match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
            Ok(ws) => {
                let registry = Arc::clone(&state.registry);
                ws.on_upgrade(move |socket| handle_socket(socket, registry))
            }
            Err(rejection) => rejection.into_response(),
        };
    }

    let path = parts.uri.path();

    if state.development && path == SIGNAL_ROUTE {
        state.registry.broadcast();
        return StatusCode::OK.into_response();
    }

    if path != "/" {
        let Some(relative) = decode_path(path) else {
            return not_found();
        };
        let file_path = state.out_dir.join(&relative);
        if file_path.is_file() {
            return serve_file(&file_path).await;
        }
        if last_segment(path).contains('.') {
            return not_found();
        }
    }

    serve_index(&state.out_dir).await
}

fn wants_websocket(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// Push reloads to one client until either side goes away.
async fn handle_socket(mut socket: WebSocket, registry: SharedRegistry) {
    let (handle, mut rx) = registry.register();

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                let Some(text) = outgoing else { break };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(client = handle.id, "ignoring client message: {}", text.as_str());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(client = handle.id, "websocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    handle.close();
    registry.unregister(handle.id);
}

/// Percent-decode a request path into a relative file path. Rejects
/// anything that would leave the output directory.
fn decode_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(clean)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

async fn serve_file(path: &Path) -> Response {
    match tokio::fs::File::open(path).await {
        Ok(file) => {
            let body = Body::from_stream(ReaderStream::new(file));
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, determine_content_type(path))],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            not_found()
        }
    }
}

async fn serve_index(out_dir: &Path) -> Response {
    match tokio::fs::read(out_dir.join(INDEX_FILE)).await {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Build output not ready",
        )
            .into_response(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "404 Not Found",
    )
        .into_response()
}

/// Content type from the file extension.
fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "wasm" => "application/wasm",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}
