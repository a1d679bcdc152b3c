//! Tagged success/error outcome.

use serde::Serialize;

use crate::http::response::ResponseContext;
use crate::protocol::error::{ApiError, ErrorInfo};

/// Outcome of a routed operation: either a value or an [`ErrorInfo`], never
/// both and never neither.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum ApiResult<T> {
    Success(T),
    Failure(ErrorInfo),
}

impl<T> ApiResult<T> {
    pub fn success(value: T) -> Self {
        ApiResult::Success(value)
    }

    pub fn failure(error: ErrorInfo) -> Self {
        ApiResult::Failure(error)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResult::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ApiResult::Success(value) => Some(value),
            ApiResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ApiResult::Success(_) => None,
            ApiResult::Failure(error) => Some(error),
        }
    }

    /// Consumes the result and returns the value.
    ///
    /// # Panics
    /// Panics when called on a failure; callers must branch on
    /// [`ApiResult::is_ok`] first.
    pub fn unwrap_value(self) -> T {
        match self {
            ApiResult::Success(value) => value,
            ApiResult::Failure(error) => {
                panic!("called `ApiResult::unwrap_value()` on a failure: {}", error)
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success(value) => ApiResult::Success(f(value)),
            ApiResult::Failure(error) => ApiResult::Failure(error),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match self {
            ApiResult::Success(value) => Ok(value),
            ApiResult::Failure(error) => Err(error),
        }
    }
}

impl<T: Serialize> ApiResult<T> {
    /// Maps the outcome to a response: 200 with the serialized value, or the
    /// error's status (500 when it is not an error code) with `{"error": ..}`.
    pub fn to_response(&self) -> ResponseContext {
        let mut response = ResponseContext::new();
        match self {
            ApiResult::Success(value) => match serde_json::to_value(value) {
                Ok(body) => response.write_json(200, body),
                Err(e) => response.write_error(&ErrorInfo::internal(e.to_string())),
            },
            ApiResult::Failure(error) => {
                let status = if error.status >= 400 { error.status } else { 500 };
                response.write_error(&ErrorInfo::new(status, error.message.clone()));
            }
        }
        response
    }
}

impl<T> From<Result<T, ApiError>> for ApiResult<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => ApiResult::Success(value),
            Err(err) => ApiResult::Failure(err.into()),
        }
    }
}
