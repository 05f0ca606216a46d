use maud::{html, Markup};

pub mod error;

pub use error::{error_banner, field_error, html_error_response};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h3 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// `<option>` list with one entry selected.
pub fn options<'a, I>(items: I, selected: Option<&str>) -> Markup
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    html! {
        @for (value, label) in items {
            option value=(value) selected[selected == Some(value)] { (label) }
        }
    }
}
