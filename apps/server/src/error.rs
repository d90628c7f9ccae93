use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::store::StoreError;

/// JSON error response structure
///
/// Mirrors the success shape of mutations: the offending `_id` is echoed
/// back whenever the client sent one.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, id: Option<String> },

    #[error("{message}")]
    NotFound { message: String, id: Option<String> },

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Validation failure that is not tied to a specific issue
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            id: None,
        }
    }

    /// Validation failure for the issue the client referenced
    pub fn validation_for(message: impl Into<String>, id: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            id: Some(id.into()),
        }
    }

    pub fn not_found(message: impl Into<String>, id: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            id: Some(id.into()),
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::Validation { message, id } | AppError::NotFound { message, id } => {
                ErrorResponse {
                    error: message.clone(),
                    id: id.clone(),
                }
            }
            AppError::InvalidBody(_) => ErrorResponse {
                error: "invalid request body".to_string(),
                id: None,
            },
            // Store details stay in the logs
            AppError::Store(_) => ErrorResponse {
                error: "internal store error".to_string(),
                id: None,
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }

        HttpResponse::build(self.status_code()).json(self.to_error_response())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
