//! Error type for the HTTP surface.
//!
//! [`ApiError`] wraps every failure a handler can hit and maps it onto an HTTP
//! status with a small JSON body, the same way generation errors would be
//! mapped onto a transport status by any other front end.
//!
//! ## Error Cases
//! - `Generation`: the generator refused the call (clock rollback, clock out
//!   of range, poisoned lock).
//! - `InvalidRequest`: the request itself was malformed.
//! - `TaskFailed`: a blocking worker task panicked or was cancelled.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub type Result<T> = core::result::Result<T, ApiError>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Underlying ID generation failed.
    #[error("ID error: {0}")]
    Generation(#[from] flakeid::Error),

    /// The client request was invalid.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A blocking task did not run to completion.
    #[error("Task failed: {context}")]
    TaskFailed { context: String },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // The clock is expected to recover; the caller may retry later.
            Self::Generation(
                flakeid::Error::ClockRolledBack { .. } | flakeid::Error::ClockBeforeEpoch { .. },
            ) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Generation(_) | Self::TaskFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_errors_are_unavailable() {
        let err = ApiError::from(flakeid::Error::ClockRolledBack { drift_ms: 3 });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn other_generation_errors_are_internal() {
        let err = ApiError::from(flakeid::Error::TimestampOverflow {
            time_delta: 2,
            max: 1,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_requests_are_bad_requests() {
        let err = ApiError::InvalidRequest {
            reason: "nope".to_owned(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request: nope");
    }
}
