use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::Utc;

use crate::models::dto::ErrorMessage;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_not_found(id: i32) -> Self {
        AppError::NotFound(format!("User with ID {} does not exist", id))
    }

    pub fn film_not_found(id: i32) -> Self {
        AppError::NotFound(format!("Film with ID {} does not exist", id))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Les erreurs serveur ne divulguent pas leur détail au client
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Unexpected error");
            "Unexpected error".to_string()
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorMessage {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message,
        })
    }
}
