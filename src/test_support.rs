// src/test_support.rs
// =============================================================================
// Helpers shared by unit tests.
//
// serve_once() starts a small axum server on 127.0.0.1 and hands back the
// first request it receives, so fetch and webhook tests never need the
// internet.
// =============================================================================

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the server saw
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

// Answers every request with `status` and `body`, and captures the first one
//
// Returns: (base URL like "http://127.0.0.1:PORT/", receiver for the first request)
pub async fn serve_once(status: u16, body: &str) -> (String, oneshot::Receiver<CapturedRequest>) {
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let status = StatusCode::from_u16(status).unwrap();
    let body = body.to_string();

    let app = Router::new().fallback(move |request: Request| {
        let tx = Arc::clone(&tx);
        let body = body.clone();
        async move {
            let (parts, incoming) = request.into_parts();
            let bytes = to_bytes(incoming, usize::MAX).await.unwrap_or_default();
            let captured = CapturedRequest {
                method: parts.method,
                path: parts.uri.path().to_string(),
                headers: parts.headers,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            };
            if let Some(tx) = tx.lock().unwrap().take() {
                let _ = tx.send(captured);
            }
            (status, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], body)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (url, rx)
}
