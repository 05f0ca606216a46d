use crate::callmode::WalkSummary;
use crate::domain::lead::format_phone;
use crate::domain::{Business, CallCounters, CallOutcome, User};
use crate::errors::FieldError;
use crate::templates::{card, desktop_layout, error_banner, field_error};
use maud::{html, Markup};

pub struct CallScreenVm<'a> {
    pub actor: &'a User,
    pub session_id: &'a str,
    pub position: (usize, usize),
    pub business: &'a Business,
    pub lead_name: String,
    pub phone: String,
    pub development: String,
    /// Whole seconds since the session started.
    pub elapsed_secs: i64,
    pub counters: CallCounters,
    pub is_last: bool,
    pub warnings: Vec<String>,
    pub field_errors: &'a [FieldError],
}

/// Choices of the single outcome control, grouped by whether someone picked up.
const UNANSWERED: [(&str, &str); 5] = [
    ("no_answer", "No answer"),
    ("voicemail", "Voicemail"),
    ("invalid_number", "Number does not exist"),
    ("not_receiving", "Not receiving calls"),
    ("whatsapp_no_answer", "Sent WhatsApp"),
];

const ANSWERED: [(&str, &str); 5] = [
    ("answered", "Answered, nothing decided"),
    ("scheduled", "Visit scheduled"),
    ("recall", "Call back later"),
    ("not_interested", "Not interested"),
    ("whatsapp", "Continue on WhatsApp"),
];

pub fn elapsed(secs: i64) -> String {
    let secs = secs.max(0);
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

pub fn call_screen(vm: &CallScreenVm) -> Markup {
    let default_choice = CallOutcome::default().form_value();
    let screen = format!("/call-mode/{}", vm.session_id);
    let action = |step: &str| format!("{screen}/{step}");

    desktop_layout(
        "Call mode",
        Some(vm.actor),
        html! {
            main class="container narrow" {
                header class="flex items-center justify-between" {
                    h1 { "Call mode" }
                    span class="muted" {
                        (vm.position.0) " of " (vm.position.1) " · " (elapsed(vm.elapsed_secs))
                    }
                }
                (error_banner(&vm.warnings, &screen))

                (card(&vm.lead_name, html! {
                    p class="phone" { a href=(format!("tel:{}", vm.phone)) { (format_phone(&vm.phone)) } }
                    p { "Development: " strong { (vm.development) } }
                    p { "Status: " strong { (vm.business.status.label()) } }
                }))

                form method="post" action=(action("next")) class="stack" {
                    label for="lead_name" { "Lead name" }
                    input type="text" id="lead_name" name="lead_name" value=(vm.lead_name);

                    fieldset {
                        legend { "Not answered" }
                        @for (value, label) in UNANSWERED {
                            label class="choice" {
                                input type="radio" name="outcome" value=(value)
                                    checked[value == default_choice];
                                (label)
                            }
                        }
                    }
                    fieldset {
                        legend { "Answered" }
                        label class="choice" {
                            input type="checkbox" name="talked" value="1";
                            "Talked with the lead"
                        }
                        @for (value, label) in ANSWERED {
                            label class="choice" {
                                input type="radio" name="outcome" value=(value);
                                (label)
                            }
                        }
                    }
                    (field_error(vm.field_errors, "outcome"))

                    label for="at" { "Visit / call back at" }
                    input type="datetime-local" id="at" name="at";
                    (field_error(vm.field_errors, "at"))

                    label for="notes" { "Notes" }
                    textarea id="notes" name="notes" rows="4" {
                        (vm.business.notes.as_deref().unwrap_or(""))
                    }

                    div class="actions" {
                        @if !vm.is_last {
                            button type="submit" class="primary" { "Next" }
                        }
                        button type="submit" formaction=(action("stop")) { "Stop" }
                    }
                }

                (counters_table(&vm.counters))
            }
        },
    )
}

pub fn counters_table(counters: &CallCounters) -> Markup {
    html! {
        table class="table compact" {
            tbody {
                @for (label, value) in counters.entries() {
                    tr { th { (label) } td { (value) } }
                }
            }
        }
    }
}

pub fn summary_page(actor: &User, summary: &WalkSummary) -> Markup {
    let secs = (summary.ended_at - summary.started_at).num_seconds();
    desktop_layout(
        "Call mode finished",
        Some(actor),
        html! {
            main class="container narrow" {
                h1 { "Session finished" }
                (error_banner(&summary.warnings, "/business"))
                p { (summary.calls) " calls in " (elapsed(secs)) }
                (counters_table(&summary.counters))
                a href="/business" class="button" { "Back to businesses" }
            }
        },
    )
}
