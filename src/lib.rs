//! HTTP bridge over a host node graph.

pub mod api;
pub mod config;
pub mod graph;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod protocol;
pub mod routing;

pub use api::build_api_router;
pub use config::BridgeConfig;
pub use graph::{MemoryNodeStore, NodeStore};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
