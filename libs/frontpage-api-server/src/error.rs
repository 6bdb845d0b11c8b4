use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use frontpage_api::{ErrorKind, FrontpageError};

/// [`FrontpageError`] as an HTTP response: status by kind, body `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub FrontpageError);

impl From<FrontpageError> for ApiError {
    fn from(e: FrontpageError) -> Self {
        Self(e)
    }
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.message }))).into_response()
    }
}
