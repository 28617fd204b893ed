use library_db::StoreError;
use library_http::error::AppError;
use serde_json::json;
use thiserror::Error;

/// Failures of the books module.
///
/// Caller errors (`InvalidSortKey`, `InvalidPaginationParameter`,
/// `InvalidInput`) are raised before any store call is made.
#[derive(Debug, Error)]
pub enum BooksError {
    #[error("invalid sort key '{given}'; expected one of {}", valid.join(", "))]
    InvalidSortKey {
        given: String,
        valid: &'static [&'static str],
    },

    #[error("invalid {parameter} {value}: {reason}")]
    InvalidPaginationParameter {
        parameter: &'static str,
        value: i64,
        reason: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },

    #[error("book {id} not found")]
    NotFound { id: u64 },

    /// The store returned a row that does not fit the book schema
    #[error("stored book record does not match the schema: field '{field}' {reason}")]
    RecordShapeMismatch {
        field: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BooksError> for AppError {
    fn from(error: BooksError) -> Self {
        let message = error.to_string();
        match error {
            BooksError::InvalidSortKey { given, valid } => AppError::bad_request_with(
                "invalid_sort_key",
                vec![json!({ "sort_by": given, "valid": valid })],
                message,
            ),
            BooksError::InvalidPaginationParameter {
                parameter, value, ..
            } => AppError::bad_request_with(
                "invalid_pagination_parameter",
                vec![json!({ "parameter": parameter, "value": value })],
                message,
            ),
            BooksError::InvalidInput { field, reason } => {
                AppError::validation(vec![json!({ "field": field, "error": reason })], message)
            }
            BooksError::NotFound { .. } => AppError::not_found(message),
            BooksError::RecordShapeMismatch { .. } => {
                AppError::fault("record_shape_mismatch", message)
            }
            BooksError::Store(_) => AppError::fault("store_error", message),
        }
    }
}
