// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorBody;
use crate::services::claila::UpstreamError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing {}", .0.join(" or "))]
    MissingParameter(Vec<&'static str>),

    #[error("Invalid session ID format")]
    InvalidSessionId,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) | AppError::InvalidSessionId => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Renders an error and every `source()` below it as `outer: inner: root`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(err), |e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Callers never learn which upstream step failed.
            AppError::Upstream(err) => {
                tracing::error!(error = %error_chain(err), step = %err.step, "Error talking to Claila");
                "Error talking to Claila".to_string()
            }
            other => other.to_string(),
        };

        (self.status(), Json(ErrorBody { error: message })).into_response()
    }
}
