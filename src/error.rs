use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

const GENERIC_SERVER_ERROR: &str = "Ошибка сервера";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Error::Config(_)
            | Error::Database(_)
            | Error::Migration(_)
            | Error::Internal(_)
            | Error::Xlsx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Flattens `validator` output into `field -> first message`.
pub fn field_messages(errors: &validator::ValidationErrors) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (field, errs) in errors.field_errors() {
        let message = errs
            .first()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .unwrap_or_default();
        out.insert(field.to_string(), message);
    }
    out
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg) => json!({ "message": msg }),
            Error::Validation(err) => json!({
                "success": false,
                "message": "Ошибки валидации",
                "errors": field_messages(&err),
            }),
            Error::TooManyRequests => json!({ "message": "Слишком много запросов" }),
            other => {
                tracing::error!(error = %other, "request failed");
                json!({ "message": GENERIC_SERVER_ERROR })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Ресурс не найден".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::BadRequest("Запись с такими данными уже существует".to_string())
            }
            other => Error::Database(other),
        }
    }
}
