use crate::errors::ServerError;
use astra::Response;

pub type ResultResp = Result<Response, ServerError>;

/// HTTP status for an error that reached the top of a handler.
pub fn status_code(err: &ServerError) -> u16 {
    match err {
        ServerError::NotFound => 404,
        ServerError::BadRequest(_) | ServerError::Validation(_) => 400,
        ServerError::Unauthorized(_) => 401,
        ServerError::Forbidden(_) => 403,
        ServerError::Api(_) => 502,
        ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => 500,
    }
}
