use crate::domain::datetime::format_local;
use crate::domain::queue::QueueFilter;
use crate::domain::scope::ScopeFilter;
use crate::domain::{Business, BusinessStatus, Development, Role, Team, User};
use crate::errors::FieldError;
use crate::templates::components::options;
use crate::templates::{desktop_layout, error_banner, field_error};
use maud::{html, Markup};

pub struct BusinessRow {
    pub business: Business,
    pub lead_name: String,
    pub phone: String,
    pub development: String,
    pub broker: String,
}

pub struct BusinessPageVm<'a> {
    pub actor: &'a User,
    pub rows: Vec<BusinessRow>,
    pub developments: &'a [Development],
    pub teams: &'a [Team],
    pub brokers: Vec<&'a User>,
    pub filter: &'a QueueFilter,
    pub scope: &'a ScopeFilter,
    pub errors: Vec<String>,
    pub field_errors: &'a [FieldError],
}

pub fn business_page(vm: &BusinessPageVm) -> Markup {
    desktop_layout(
        "Businesses",
        Some(vm.actor),
        html! {
            main class="container" {
                h1 { "Businesses" }
                (error_banner(&vm.errors, "/business?refresh=1"))
                (filter_form(vm))

                @if vm.rows.is_empty() {
                    p class="muted" { "No businesses match these filters." }
                } @else {
                    table class="table" {
                        thead {
                            tr {
                                th { "Lead" }
                                th { "Phone" }
                                th { "Development" }
                                th { "Broker" }
                                th { "Status" }
                                th { "Last call" }
                                th {}
                            }
                        }
                        tbody {
                            @for row in &vm.rows {
                                (business_row(row))
                            }
                        }
                    }
                }
            }
        },
    )
}

fn filter_form(vm: &BusinessPageVm) -> Markup {
    let status = vm.filter.status.map(BusinessStatus::as_str);
    html! {
        form method="get" action="/business" class="filters" {
            label {
                "Development"
                select name="development" {
                    option value="" { "All" }
                    (options(vm.developments.iter().map(|d| (d.id.as_str(), d.name.as_str())),
                        vm.filter.development_id.as_deref()))
                }
                (field_error(vm.field_errors, "development"))
            }
            label {
                "Status"
                select name="status" {
                    option value="" { "All" }
                    (options(BusinessStatus::ALL.iter().map(|s| (s.as_str(), s.label())), status))
                }
                (field_error(vm.field_errors, "status"))
            }
            @if vm.actor.role == Role::Admin {
                label {
                    "Team"
                    select name="team" {
                        option value="" { "All" }
                        (options(vm.teams.iter().map(|t| (t.id.as_str(), t.name.as_str())),
                            vm.scope.team_id.as_deref()))
                    }
                }
            }
            @if !vm.brokers.is_empty() {
                label {
                    "Broker"
                    select name="broker" {
                        option value="" { "All" }
                        (options(vm.brokers.iter().map(|u| (u.id.as_str(), u.name.as_str())),
                            vm.scope.broker_id.as_deref()))
                    }
                }
            }
            label {
                "Lead"
                input type="search" name="q" value=(vm.filter.search) placeholder="Name";
            }
            button type="submit" { "Filter" }
            button type="submit" class="primary" formmethod="post" formaction="/call-mode/start" {
                "Start call mode"
            }
            (field_error(vm.field_errors, "queue"))
        }
    }
}

fn business_row(row: &BusinessRow) -> Markup {
    let b = &row.business;
    let date = b.scheduled_at.or(b.recall_at).map(|d| format_local(&d));
    html! {
        tr {
            td { (row.lead_name) }
            td { (row.phone) }
            td { (row.development) }
            td { (row.broker) }
            td {
                span class=(format!("badge {}", b.status.as_str())) { (b.status.label()) }
                @if let Some(d) = &date {
                    " " small { (d.replace('T', " ")) }
                }
            }
            td {
                @match b.last_call_at {
                    Some(t) => (t.format("%Y-%m-%d %H:%M").to_string()),
                    None => span class="muted" { "never" },
                }
            }
            td {
                form method="post" action=(format!("/business/{}/status", b.id)) class="inline" {
                    select name="status" {
                        (options(BusinessStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
                            Some(b.status.as_str())))
                    }
                    input type="datetime-local" name="at" value=[date.as_deref()];
                    button type="submit" { "Save" }
                }
                form method="post" action=(format!("/business/{}/delete", b.id)) class="inline"
                    onsubmit="return confirm('Delete this business?')" {
                    button type="submit" class="link" { "Delete" }
                }
            }
        }
    }
}
