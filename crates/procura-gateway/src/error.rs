//! HTTP error mapping.
//!
//! Every failure becomes a `{ "message": ... }` body with the status the
//! taxonomy prescribes: 400 for validation, conflict, and invalid-state
//! failures, 401 for auth, 404 for missing entities, 500 for storage.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use procura_core::PortalError;

/// Wrapper turning `PortalError` into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub PortalError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PortalError::Validation(_)
            | PortalError::Conflict(_)
            | PortalError::InvalidState(_) => StatusCode::BAD_REQUEST,
            PortalError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", self.0);
        }

        let message = match &self.0 {
            // Internal details stay in the log.
            PortalError::Storage(_) => "Server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
