use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("price provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("alert store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("failed to persist alerts: {0}")]
    Persistence(String),

    #[error("alert {0} not found")]
    NotFound(u64),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to HTTP clients; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::UpstreamUnavailable(_) => "Failed to fetch crypto prices".to_string(),
            AppError::StoreUnavailable(_) => "Failed to read alerts".to_string(),
            AppError::Persistence(_) => "Failed to save alerts to file".to_string(),
            AppError::NotFound(_) => "Alert not found".to_string(),
            AppError::Notification(_) => "Failed to send email".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
