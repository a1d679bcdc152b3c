//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (method, uri/path)
//!     → router.rs  (per-method route list, registration order)
//!     → matcher.rs (start-anchored pattern, captures)
//!     → handler.rs (pre_process → process → post_process | on_error)
//!     → ApiResult<Value> + ResponseContext
//!
//! Route registration (at startup):
//!     (method, pattern, handler)
//!     → Compile pattern once
//!     → Append to the method's list
//!     → Share as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod handler;
pub mod matcher;
pub mod router;

pub use handler::{FnHandler, HandlerResult, RequestHandler};
pub use matcher::{PathCaptures, PathPattern};
pub use router::{Route, RouteMatch, Router, RouterError};
