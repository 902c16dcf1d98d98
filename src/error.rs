use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::{response::ApiResponse, validation::FieldErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    Conflict(String),

    /// Unknown and expired tokens share this variant so callers cannot tell them apart.
    #[error("Invalid or expired download token.")]
    DownloadDenied,

    #[error("The book file is not available at this moment.")]
    AssetUnavailable,

    #[error("There was an error processing your payment. Please try again or contact support.")]
    PaymentFailed,

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Storage error")]
    Io(#[from] std::io::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorData {
    Message { error: String },
    Fields { errors: FieldErrors },
}

impl AppError {
    /// A delete refused by a foreign key becomes a conflict with `message`.
    pub fn restricted(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(message.into()),
            _ => AppError::OrmError(err),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::DownloadDenied | AppError::AssetUnavailable => {
                StatusCode::NOT_FOUND
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PaymentFailed
            | AppError::OrmError(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let message = self.to_string();
        let data = match self {
            AppError::Validation(errors) => Some(ErrorData::Fields { errors }),
            // Token and asset denials carry only the message.
            AppError::DownloadDenied | AppError::AssetUnavailable => None,
            _ => Some(ErrorData::Message {
                error: message.clone(),
            }),
        };

        (status, axum::Json(ApiResponse::failure(message, data))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let mut errors = FieldErrors::default();
        errors.add("body", rejection.body_text());
        AppError::Validation(errors)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_database_errors_stay_server_errors() {
        let err = AppError::restricted(DbErr::Custom("connection reset".into()), "in use");
        assert!(matches!(err, AppError::OrmError(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
