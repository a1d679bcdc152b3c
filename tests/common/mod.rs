//! Shared harness for the API integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use serde_json::Value;
use tower::ServiceExt;

use node_bridge::{build_api_router, BridgeConfig, HttpServer, MemoryNodeStore, Shutdown};

/// Seeded store plus a server wired to it.
pub fn seeded_server() -> (Arc<MemoryNodeStore>, HttpServer) {
    let config = BridgeConfig::default();
    let store = Arc::new(MemoryNodeStore::new(&config.project.root_path).unwrap());
    store.seed_demo().unwrap();
    let router = build_api_router(store.clone(), &config.server.name).unwrap();
    (store, HttpServer::new(config, Arc::new(router)))
}

/// Send one request through the full middleware stack without a socket.
pub async fn call(server: &HttpServer, method: Method, uri: &str, body: Option<&Value>) -> (u16, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = server.app().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Serve on an ephemeral port until the returned `Shutdown` fires.
#[allow(dead_code)]
pub async fn spawn_server(server: HttpServer) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });
    (addr, shutdown, handle)
}
