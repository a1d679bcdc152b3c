//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace layers)
//!     → request.rs (method, path, query, body → RequestContext)
//!     → [routing::Router dispatches to a handler]
//!     → response.rs (ResponseContext → status, JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, UuidRequestId, X_REQUEST_ID};
pub use response::ResponseContext;
pub use server::HttpServer;
