//! Error taxonomy for the analytics pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Connectivity or query failure in the relational store.
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),

    /// A bounded request parameter fell outside its accepted range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AnalyticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalyticsError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Analytics request failed: {}", self);
        } else {
            tracing::debug!("Rejected analytics request: {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_is_client_error() {
        let err = AnalyticsError::InvalidParameter {
            name: "limit",
            value: 0,
            min: 1,
            max: 50,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "limit must be between 1 and 50, got 0");
    }

    #[test]
    fn test_store_error_is_server_error() {
        let err = AnalyticsError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
