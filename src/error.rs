//! Error type shared by services and route handlers.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::views::NotFoundTemplate;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before touching the database (e.g. missing password).
    #[error("validation error: {0}")]
    Validation(String),

    /// A unique constraint rejected the write (duplicate username, email, ...).
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("{0} not found")]
    NotFound(String),

    /// No session user.
    #[error("access unauthorized")]
    Unauthorized,

    /// Session user may not act on this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => AppError::Integrity(msg),
            _ => AppError::Database(err),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {err}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Integrity(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::SEE_OTHER,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized => HttpResponse::SeeOther()
                .append_header((header::LOCATION, "/"))
                .finish(),
            AppError::NotFound(_) => {
                let body = NotFoundTemplate { current_user: None }
                    .render()
                    .unwrap_or_else(|_| "Not Found".to_string());
                HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(body)
            }
            AppError::Database(e) => {
                log::error!("Database error: {:?}", e);
                HttpResponse::InternalServerError().body("Internal server error")
            }
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().body("Internal server error")
            }
            other => HttpResponse::build(other.status_code()).body(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_redirects_home() {
        let resp = AppError::Unauthorized.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[test]
    fn plain_db_errors_are_not_integrity_errors() {
        let err: AppError = DbErr::RecordNotFound("users".to_string()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
