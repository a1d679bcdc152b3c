//! Host node graph access.
//!
//! # Responsibilities
//! - Define the store contract the API handlers depend on
//! - Convert arbitrary host values into JSON ([`serializer`])
//! - Collect nested node summaries without looping on cycles ([`walker`])
//! - Provide an in-memory reference store
//!
//! # Data Flow
//! ```text
//! Handler ──▶ NodeStore ──▶ NodeRef / HostValue
//!                │
//!                ▼
//!          GraphWalker ──▶ NodeSummary ──▶ serializer ──▶ JSON
//! ```

pub mod catalog;
pub mod memory;
pub mod serializer;
pub mod store;
pub mod summary;
pub mod value;
pub mod walker;

pub use memory::MemoryNodeStore;
pub use serializer::{serialize, serialize_named};
pub use store::{Link, NodeConnectors, NodeRef, NodeStore, NodeTypeInfo, StoreError};
pub use summary::{NodeSummary, NodeSummaryLight};
pub use value::HostValue;
pub use walker::GraphWalker;
