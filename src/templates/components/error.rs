use crate::errors::{FieldError, ServerError};
use crate::responses::status_code;
use astra::{Body, Response, ResponseBuilder};
use maud::{html, Markup, DOCTYPE};

/// Full error page for an error that escaped a handler.
pub fn html_error_response(err: ServerError) -> Response {
    let status = status_code(&err);
    if status >= 500 {
        log::error!("Request failed: {err}");
    } else {
        log::debug!("Request rejected: {err}");
    }
    render_error(status, &err.to_string())
}

fn render_error(status: u16, message: &str) -> Response {
    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Error " (status) }
                link rel="stylesheet" href="/static/main.css";
            }
            body class="container narrow" {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/business" { "← Back to businesses" } }
            }
        }
    };

    // A static status and header cannot make the builder fail.
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(page.into_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

/// Dismissible banner listing failed operations. `dismiss_href` is where the
/// close link goes; for fetch errors that reloads the data.
pub fn error_banner(messages: &[String], dismiss_href: &str) -> Markup {
    html! {
        @if !messages.is_empty() {
            div class="banner error" role="alert" {
                ul {
                    @for m in messages {
                        li { (m) }
                    }
                }
                a class="dismiss" href=(dismiss_href) { "Dismiss" }
            }
        }
    }
}

/// Inline message under a form control, if that field failed validation.
pub fn field_error(errors: &[FieldError], field: &str) -> Markup {
    html! {
        @for e in errors.iter().filter(|e| e.field == field) {
            p class="field-error" { (e.message) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn error_page_carries_status_and_message() {
        let resp = html_error_response(ServerError::Forbidden("not yours".into()));
        assert_eq!(resp.status(), 403);

        let mut body = String::new();
        resp.into_body().reader().read_to_string(&mut body).unwrap();
        assert!(body.contains("not yours"));
    }

    #[test]
    fn field_error_renders_only_its_field() {
        let errors = vec![
            FieldError::new("development", "select a development"),
            FieldError::new("status", "select a status"),
        ];
        let out = field_error(&errors, "status").into_string();
        assert!(out.contains("select a status"));
        assert!(!out.contains("select a development"));
    }
}
