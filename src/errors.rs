// errors.rs
use std::fmt;

/// A single form field that failed validation, rendered next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors originating from the web tier (routing, validation, sessions)
/// or from downstream layers (CRM API, local database, spreadsheets).
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Validation(Vec<FieldError>),
    Api(String),
    DbError(String),
    XlsxError(String),
    InternalError,
}

impl ServerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServerError::Validation(vec![FieldError::new(field, message)])
    }

    /// Field errors carried by a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ServerError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ServerError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ServerError::Validation(errors) => {
                let joined = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Validation failed: {joined}")
            }
            ServerError::Api(msg) => write!(f, "CRM API Error: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Spreadsheet Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(e: reqwest::Error) -> Self {
        ServerError::Api(format!("request failed: {e}"))
    }
}
