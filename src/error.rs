use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;

use crate::models::FieldError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the store or of startup I/O.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,

    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io) => io,
            other => std::io::Error::other(other),
        }
    }
}

/// Outcome of a request that did not succeed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("post not found")]
    NotFound,

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Internal(#[from] Error),
}

#[derive(Serialize)]
struct ErrorBody {
    errors: Vec<FieldError>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::NotFound => HttpResponse::NotFound().finish(),
            ApiError::Validation(errors) => HttpResponse::BadRequest().json(ErrorBody {
                errors: errors.clone(),
            }),
            ApiError::Malformed(message) => HttpResponse::BadRequest().json(ErrorBody {
                errors: vec![FieldError {
                    field: None,
                    message: message.clone(),
                }],
            }),
            ApiError::Internal(err) => {
                error!("Request failed: {}", err);
                HttpResponse::InternalServerError().json("500 Internal Server Error")
            }
        }
    }
}
