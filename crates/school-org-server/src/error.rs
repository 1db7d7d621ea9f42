use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use school_org::OrgError;
use serde::Serialize;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub OrgError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl From<OrgError> for ApiError {
    fn from(err: OrgError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
            self.0.to_string()
        };

        let body = ErrorBody {
            error: message,
            code: self.0.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
