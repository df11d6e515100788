//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response, StatusCode},
    routing::any,
    Router,
};
use maintenance_warden::{Warden, WardenConfig};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const BACKEND_BODY: &str = "backend response";

/// Router standing in for the real service, gated by a `Warden` built from `config`.
pub fn gated_app(config: WardenConfig) -> Router {
    let backend = Router::new()
        .route("/", any(backend_handler))
        .route("/{*path}", any(backend_handler));
    Arc::new(Warden::new(&config).unwrap()).attach(backend)
}

async fn backend_handler() -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header("x-backend", "reached")
        .body(Body::from(BACKEND_BODY))
        .unwrap()
}

/// Inline-content config with everything else defaulted.
pub fn inline_config() -> WardenConfig {
    WardenConfig {
        maintenance_content: "<h1>Under maintenance</h1>".to_string(),
        ..WardenConfig::default()
    }
}

pub fn request(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    builder.body(Body::empty()).unwrap()
}

/// Send one request through `app`, returning the response and its body text.
pub async fn send(app: &Router, req: Request<Body>) -> (Response<Body>, String) {
    let response = app.clone().oneshot(req).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    (
        Response::from_parts(parts, Body::empty()),
        String::from_utf8_lossy(&bytes).into_owned(),
    )
}

/// Start a raw HTTP/1.1 backend on an ephemeral port.
///
/// `f` receives the request head (request line + headers) and returns the
/// status line suffix (e.g. "200 OK") and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (&'static str, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let (status, body) = f(head).await;
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nX-Served-By: mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
