use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse};
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::order::UnavailableLine;

/// Every response body, success or failure, carries a `message` field;
/// insufficient-stock rejections additionally itemize the shortfall.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Some items are not available in requested quantity")]
    InsufficientStock(Vec<UnavailableLine>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyCart => AppError::EmptyCart,
            DomainError::InsufficientStock(report) => AppError::InsufficientStock(report),
            DomainError::NotFound => AppError::NotFound("Order not found".to_string()),
            DomainError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(_) | AppError::EmptyCart => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "message": self.to_string()
                }))
            }
            AppError::InsufficientStock(report) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "message": self.to_string(),
                    "unavailableItems": report
                }))
            }
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(serde_json::json!({
                "message": self.to_string()
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "message": self.to_string()
            })),
            AppError::Internal(msg) => {
                log::error!("internal error: {msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "message": "Internal server error"
                }))
            }
        }
    }
}

/// Maps `web::Json` extractor failures (unreadable or untypable bodies)
/// into the `message`-keyed 400 the rest of the API answers with.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

/// Maps `web::Path` extractor failures (malformed ids) into the same
/// `message`-keyed 400.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}
