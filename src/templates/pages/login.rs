use crate::templates::{desktop_layout, error_banner};
use maud::{html, Markup};

pub fn login_page(email: &str, error: Option<&str>) -> Markup {
    let errors: Vec<String> = error.map(str::to_string).into_iter().collect();
    desktop_layout(
        "Sign in",
        None,
        html! {
            main class="container narrow" {
                h1 { "Sign in" }
                (error_banner(&errors, "/login"))

                form method="post" action="/login" class="stack" {
                    label for="email" { "Email" }
                    input type="email" id="email" name="email" value=(email)
                        autocomplete="email" required;

                    label for="password" { "Password" }
                    input type="password" id="password" name="password"
                        autocomplete="current-password" required;

                    button type="submit" class="primary" { "Sign in" }
                }
            }
        },
    )
}
