pub mod assets;
pub mod errors;
pub mod html;
pub mod xlsx;

pub use assets::{css_response, MAIN_CSS};
pub use errors::{status_code, ResultResp};
pub use html::{html_response, html_response_with_status, redirect, redirect_with_cookie};
pub use xlsx::xlsx_response;
