//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<T, AppError>`; anything convertible into
//! [`scenestream_common::Error`] can be propagated with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scenestream_common::Error;
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self(Error::from(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in API handler");
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
        }

        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
