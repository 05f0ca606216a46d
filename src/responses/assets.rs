use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

/// Stylesheet linked from every page, compiled into the binary.
pub const MAIN_CSS: &str = include_str!("../../static/main.css");

pub fn css_response(css: &'static str) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", "text/css; charset=utf-8")
        .header("Cache-Control", "public, max-age=3600")
        .body(Body::from(css))
        .map_err(|_| ServerError::InternalError)
}
