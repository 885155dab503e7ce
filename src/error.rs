use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid record kind: {0:?}")]
    InvalidRecordKind(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRecordKind(_)
            | Self::InvalidAmount(_)
            | Self::InvalidDate(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Migration(_) | Self::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error.".to_string()
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
