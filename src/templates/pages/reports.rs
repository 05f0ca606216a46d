use crate::domain::{LeadSource, Role, Team, User};
use crate::reports::aggregate::{percent, ReportTotals};
use crate::templates::components::options;
use crate::templates::pages::call_mode::counters_table;
use crate::templates::{card, desktop_layout, error_banner};
use maud::{html, Markup};

/// Raw filter values as submitted, echoed back into the form.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub from: String,
    pub to: String,
    pub team: String,
    pub broker: String,
    pub source: String,
}

impl ReportQuery {
    /// Query string for the export link.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("from", &self.from)
            .append_pair("to", &self.to)
            .append_pair("team", &self.team)
            .append_pair("broker", &self.broker)
            .append_pair("source", &self.source)
            .finish()
    }
}

pub struct ReportsVm<'a> {
    pub actor: &'a User,
    pub query: &'a ReportQuery,
    pub totals: ReportTotals,
    pub teams: &'a [Team],
    pub brokers: Vec<&'a User>,
    pub errors: Vec<String>,
}

pub fn reports_page(vm: &ReportsVm) -> Markup {
    let q = vm.query;
    let t = &vm.totals;
    desktop_layout(
        "Reports",
        Some(vm.actor),
        html! {
            main class="container" {
                h1 { "Call reports" }
                (error_banner(&vm.errors, "/reports"))

                form method="get" action="/reports" class="filters" {
                    label { "From" input type="date" name="from" value=(q.from); }
                    label { "To" input type="date" name="to" value=(q.to); }
                    @if vm.actor.role == Role::Admin {
                        label {
                            "Team"
                            select name="team" {
                                option value="" { "All" }
                                (options(vm.teams.iter().map(|team| (team.id.as_str(), team.name.as_str())),
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
                    label {
                        "Source"
                        select name="source" {
                            option value="" { "All" }
                            (options(LeadSource::ALL.iter().map(|s| (s.as_str(), s.label())),
                                Some(q.source.as_str())))
                        }
                    }
                    button type="submit" { "Apply" }
                    a class="button" href=(format!("/reports/export?{}", q.to_query())) { "Export XLSX" }
                }

                div class="grid" {
                    (card("Calls", html! { p class="big" { (t.attempts) } small { (t.sessions) " sessions" } }))
                    (card("Answer rate", html! { p class="big" { (percent(t.answer_rate())) } }))
                    (card("Talk rate", html! { p class="big" { (percent(t.talk_rate())) } }))
                    (card("Schedule rate", html! { p class="big" { (percent(t.schedule_rate())) } }))
                }

                (counters_table(&t.counters))
            }
        },
    )
}
