use crate::domain::{Development, Role, SaleStatus, Team, User};
use crate::reports::commissions::format_brl;
use crate::reports::{CommissionRow, CommissionTotals};
use crate::templates::components::options;
use crate::templates::{card, desktop_layout, error_banner};
use maud::{html, Markup};

/// Raw filter values as submitted, echoed back into the form.
#[derive(Debug, Clone, Default)]
pub struct CommissionQuery {
    pub q: String,
    pub development: String,
    pub status: String,
    pub year: String,
    pub team: String,
    pub broker: String,
}

pub struct CommissionsVm<'a> {
    pub actor: &'a User,
    pub title: &'a str,
    pub query: &'a CommissionQuery,
    pub rows: Vec<CommissionRow>,
    pub totals: CommissionTotals,
    pub years: Vec<i32>,
    pub developments: &'a [Development],
    pub teams: &'a [Team],
    pub brokers: Vec<&'a User>,
    pub errors: Vec<String>,
}

pub fn commissions_page(vm: &CommissionsVm) -> Markup {
    let t = &vm.totals;
    desktop_layout(
        vm.title,
        Some(vm.actor),
        html! {
            main class="container" {
                h1 { (vm.title) }
                (error_banner(&vm.errors, "/commissions"))

                div class="grid" {
                    (card("Sales", html! { p class="big" { (t.sales) } }))
                    (card("Total sold", html! { p class="big" { (format_brl(t.total_value)) } }))
                    (card("Commissions", html! { p class="big" { (format_brl(t.commission_value)) } }))
                }

                (filter_form(vm))

                @if vm.rows.is_empty() {
                    p class="muted" { "No commissions found." }
                } @else {
                    table class="table" {
                        thead {
                            tr {
                                th { "Buyer" }
                                th { "Second buyer" }
                                th { "Development" }
                                th { "Block / lot" }
                                th { "Purchase" }
                                th { "Value" }
                                th { "Commission" }
                                th { "Status" }
                            }
                        }
                        tbody {
                            @for row in &vm.rows {
                                (commission_row(row))
                            }
                        }
                    }
                }
            }
        },
    )
}

fn filter_form(vm: &CommissionsVm) -> Markup {
    let q = vm.query;
    let years: Vec<String> = vm.years.iter().map(i32::to_string).collect();
    html! {
        form method="get" action="/commissions" class="filters" {
            label { "Search" input type="search" name="q" value=(q.q); }
            label {
                "Development"
                select name="development" {
                    option value="" { "All" }
                    (options(vm.developments.iter().map(|d| (d.id.as_str(), d.name.as_str())),
                        Some(q.development.as_str())))
                }
            }
            label {
                "Status"
                select name="status" {
                    option value="" { "All" }
                    (options(SaleStatus::ALL.iter().map(|s| (s.as_str(), s.label())),
                        Some(q.status.as_str())))
                }
            }
            label {
                "Year"
                select name="year" {
                    option value="" { "All" }
                    (options(years.iter().map(|y| (y.as_str(), y.as_str())), Some(q.year.as_str())))
                }
            }
            @if vm.actor.role == Role::Admin {
                label {
                    "Team"
                    select name="team" {
                        option value="" { "All" }
                        (options(vm.teams.iter().map(|t| (t.id.as_str(), t.name.as_str())),
                            Some(q.team.as_str())))
                    }
                }
            }
            @if !vm.brokers.is_empty() {
                label {
                    "Broker"
                    select name="broker" {
                        option value="" { "All" }
                        (options(vm.brokers.iter().map(|u| (u.id.as_str(), u.name.as_str())),
                            Some(q.broker.as_str())))
                    }
                }
            }
            button type="submit" { "Apply" }
        }
    }
}

fn commission_row(row: &CommissionRow) -> Markup {
    let s = &row.sale;
    html! {
        tr {
            td {
                @match &row.buyer {
                    Some(c) => { (c.name) br; small class="muted" { (c.cpf) } },
                    None => span class="muted" { "buyer not found" },
                }
            }
            td {
                @if let Some(c) = &row.second_buyer {
                    (c.name) br; small class="muted" { (c.cpf) }
                } @else {
                    span class="muted" { "-" }
                }
            }
            td { (row.development) }
            td { (s.block_number) " / " (s.lot_number) }
            td { (s.purchase_date.format("%d/%m/%Y").to_string()) }
            td { (format_brl(s.total_value)) }
            td { (format_brl(s.commission_value)) }
            td { (s.status.label()) }
        }
    }
}
