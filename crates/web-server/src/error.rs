use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Database(#[from] DbError),
    #[error("{0}")]
    Validation(#[from] core_types::CoreError),
    #[error("{0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Lookup misses become 404, rejected input (including bodies that are not
/// JSON) 400. Anything else is a 500 that carries the underlying error text.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(DbError::NotFound(entity)) => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            AppError::Database(
                db_err @ (DbError::InvalidReference | DbError::DuplicateKey { .. }),
            ) => {
                tracing::warn!(error = %db_err, "Request rejected.");
                (StatusCode::BAD_REQUEST, db_err.to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (StatusCode::INTERNAL_SERVER_ERROR, db_err.to_string())
            }
            AppError::Validation(core_err) => {
                tracing::warn!(error = %core_err, "Request failed validation.");
                (StatusCode::BAD_REQUEST, core_err.to_string())
            }
            AppError::JsonRejection(rejection) => {
                tracing::warn!(error = %rejection, "Request body rejected.");
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
