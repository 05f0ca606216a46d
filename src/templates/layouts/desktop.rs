use crate::domain::User;
use maud::{html, Markup, DOCTYPE};

/// Page shell. Navigation is shown once someone is signed in.
pub fn desktop_layout(title: &str, actor: Option<&User>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · CRM" }
                link rel="stylesheet" href="/static/main.css";
            }
            body {
              header class="flex items-center justify-between px-6 py-3 shadow" {
                  h3 { "CRM" }
                  @if let Some(user) = actor {
                      nav {
                          ul {
                              li { a href="/business" { "Businesses" } }
                              li { a href="/reports" { "Reports" } }
                              li { a href="/commissions" { "Commissions" } }
                          }
                      }
                      div class="inline" {
                          span class="muted" { (user.name) }
                          form method="post" action="/logout" class="inline" {
                              button type="submit" class="link" { "Sign out" }
                          }
                      }
                  } @else {
                      a href="/login" class="text-base font-medium" { "Sign in" }
                  }
              }
                (content)
            }
        }
    }
}
