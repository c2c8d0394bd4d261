use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::client::SendError;
use crate::staging::{FetchError, ValidationError};

/// Every way a send request can fail, mapped to a status and a
/// `{"error": "..."}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API key")]
    Unauthorized,

    #[error("missing {0} parameter")]
    MissingFields(&'static str),

    /// The detail is logged, the caller only sees a generic message.
    #[error("invalid JSON data")]
    MalformedBody(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to send {what} message: {source}")]
    Send {
        what: &'static str,
        #[source]
        source: SendError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingFields(_)
            | ApiError::MalformedBody(_)
            | ApiError::Fetch(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Send { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::MalformedBody(detail) => warn!("Could not parse request body: {}", detail),
            ApiError::Send { .. } => error!("{}", self),
            _ => warn!("Request rejected ({}): {}", status.as_u16(), self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
