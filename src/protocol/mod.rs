//! Success/error protocol shared by every operation.
//!
//! # Data Flow
//! ```text
//! handler / store call
//!     → Result<T, ApiError>        (typed, `?`-friendly inside handlers)
//!     → ApiResult<T>               (tagged outcome returned by the router)
//!     → ResponseContext            (status line + JSON body)
//! ```
//!
//! # Design Decisions
//! - `ApiResult` is an enum: a value and an error can never coexist
//! - Every error carries an HTTP status drawn from a fixed reason table
//! - Error bodies are always `{"error": "<message>"}`

pub mod error;
pub mod result;

pub use error::{status_reason, ApiError, ErrorInfo};
pub use result::ApiResult;
