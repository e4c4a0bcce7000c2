use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failure of an API request, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Routing(sheltr_core::Error),
    Timeout,
    Internal(String),
}

impl From<sheltr_core::Error> for ApiError {
    fn from(err: sheltr_core::Error) -> Self {
        ApiError::Routing(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        use sheltr_core::Error;
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Routing(Error::InvalidData(_) | Error::InvalidNodeIndex) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Routing(Error::NoPathFound) => StatusCode::NOT_FOUND,
            ApiError::Routing(Error::SnapFailed | Error::EmptyNetwork) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Routing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.clone(),
            ApiError::Routing(err) => err.to_string(),
            ApiError::Timeout => "Route computation timed out".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.message(), "Request failed");
        } else {
            tracing::debug!(error = %self.message(), %status, "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
