use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use super::auth::AuthError;
use crate::storage::DataAccessError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("already taken")]
    AlreadyTaken,
    #[error("bad request")]
    BadRequest,
    #[error("{0}")]
    Storage(DataAccessError),
    #[error("{0}")]
    Internal(String),
}

impl From<DataAccessError> for ServiceError {
    fn from(e: DataAccessError) -> Self {
        match e {
            DataAccessError::UsernameTaken(_) => ServiceError::AlreadyTaken,
            DataAccessError::GameNotFound(_) => ServiceError::BadRequest,
            other => ServiceError::Storage(other),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => ServiceError::Unauthorized,
            AuthError::Storage(e) => e.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::AlreadyTaken => StatusCode::FORBIDDEN,
            ServiceError::BadRequest => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: format!("Error: {}", self),
        })
    }
}
