use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::error::{DomainError, ErrorKind};

/// json body for every failed request outside registration
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::InvalidKey | ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyRegistered | ErrorKind::NotRegistered | ErrorKind::NoCapacity => StatusCode::CONFLICT,
        ErrorKind::TransientConflict => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: DomainError) -> Response {
    let kind = err.kind();
    let message = match kind {
        ErrorKind::Unknown => {
            error!(error = %err, "request failed");
            "Unknown exception".to_string()
        }
        _ => err.to_string(),
    };
    (status_for(kind), Json(ErrorResponse { kind, message })).into_response()
}
