//! Integration tests for the development server.
//!
//! Routing is driven through the router directly; live reload is tested over
//! a real socket with a WebSocket client.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use futures::StreamExt;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;
use webserve_cli::dev::{
    ConnectionRegistry, DevServer, DevServerState, RELOAD_MESSAGE, SIGNAL_ROUTE, build_router,
};

const INDEX: &str = "<html><body>app</body></html>";

fn output_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();
    fs::write(dir.path().join("bundle.js"), "console.log(1)").unwrap();
    fs::create_dir_all(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    dir
}

async fn get(state: Arc<DevServerState>, method: Method, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, content_type, body)
}

/// Poll `check` until it holds or two seconds pass.
async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

#[tokio::test]
async fn test_extensionless_path_serves_document() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), false));

    for uri in ["/", "/app", "/users/42"] {
        let (status, content_type, body) = get(Arc::clone(&state), Method::GET, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(content_type.starts_with("text/html"), "{}", uri);
        assert_eq!(body, INDEX.as_bytes(), "{}", uri);
    }
}

#[tokio::test]
async fn test_existing_file_served_verbatim() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), false));

    let (status, content_type, body) = get(Arc::clone(&state), Method::GET, "/bundle.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/javascript");
    assert_eq!(body, b"console.log(1)");

    let (status, content_type, body) = get(state, Method::GET, "/assets/logo.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "image/png");
    assert_eq!(body, [0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), false));

    let (status, content_type, body) = get(state, Method::GET, "/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, b"404 Not Found");
}

#[tokio::test]
async fn test_traversal_is_not_found() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path().join("assets"), false));

    let (status, _, _) = get(state, Method::GET, "/%2e%2e/bundle.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_not_ready() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(DevServerState::new(dir.path(), false));

    let (status, _, _) = get(state, Method::GET, "/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_document_read_fresh_per_request() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), false));

    let (_, _, first) = get(Arc::clone(&state), Method::GET, "/").await;
    fs::write(dir.path().join("index.html"), "<html>v2</html>").unwrap();
    let (_, _, second) = get(state, Method::GET, "/").await;

    assert_eq!(first, INDEX.as_bytes());
    assert_eq!(second, b"<html>v2</html>");
}

#[tokio::test]
async fn test_signal_route_broadcasts_in_development() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), true));
    let (_handle, mut rx) = state.registry.register();

    for method in [Method::POST, Method::GET] {
        let (status, _, body) = get(Arc::clone(&state), method, SIGNAL_ROUTE).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(rx.recv().await.as_deref(), Some(RELOAD_MESSAGE));
    }
}

#[tokio::test]
async fn test_signal_route_inert_in_production() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), false));
    let (_handle, mut rx) = state.registry.register();

    let (status, _, body) = get(Arc::clone(&state), Method::POST, SIGNAL_ROUTE).await;

    // falls through to the document like any extension-less path
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX.as_bytes());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_fan_out_reaches_only_open_clients() {
    let registry = ConnectionRegistry::new();
    let mut open = Vec::new();
    for _ in 0..3 {
        open.push(registry.register());
    }
    let (closed, mut closed_rx) = registry.register();
    closed.close();

    assert_eq!(registry.broadcast(), 3);

    for (_, rx) in &mut open {
        assert_eq!(rx.recv().await.as_deref(), Some(RELOAD_MESSAGE));
    }
    assert!(closed_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_websocket_client_receives_reload() {
    let dir = output_dir();
    let state = Arc::new(DevServerState::new(dir.path(), true));
    let server = DevServer::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&state))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/", addr))
        .await
        .unwrap();
    assert!(eventually(|| state.registry.open_count() == 1).await);

    let response = reqwest::Client::new()
        .post(format!("http://{}{}", addr, SIGNAL_ROUTE))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(message, Message::text(RELOAD_MESSAGE));

    socket.close(None).await.unwrap();
    assert!(eventually(|| state.registry.is_empty()).await);
    assert_eq!(state.registry.broadcast(), 0);
}
