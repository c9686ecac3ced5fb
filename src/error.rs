use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("topic {0} not found")]
    TopicNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("blocking task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::TopicNotFound(_) | CatalogError::Database(diesel::result::Error::NotFound)
        )
    }
}

/// HTTP-facing failure. Bodies carry a fixed message; the cause is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps a store failure onto the response for one endpoint.
    pub fn from_catalog(err: CatalogError, failure_message: &'static str) -> Self {
        if err.is_not_found() {
            return ApiError::NotFound("Topic not found");
        }
        tracing::error!(error = %err, "{}", failure_message);
        ApiError::Internal(failure_message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
