// src/handlers/commissions.rs

use crate::domain::scope::{resolve_visibility, selectable_brokers};
use crate::domain::{Client, Role, Sale, SaleStatus, User};
use crate::handlers::{scope_filter, Directory};
use crate::reports::{commission_rows, commission_totals, sale_years, CommissionFilter};
use crate::responses::{html_response, ResultResp};
use crate::router::{param, Params};
use crate::state::AppState;
use crate::templates::pages::{commissions_page, CommissionQuery, CommissionsVm};

fn commission_query(params: &Params) -> CommissionQuery {
    let get = |key: &str| param(params, key).unwrap_or("").to_string();
    CommissionQuery {
        q: get("q"),
        development: get("development"),
        status: get("status"),
        year: get("year"),
        team: get("team"),
        broker: get("broker"),
    }
}

/// Commission table and totals. Load failures go to the banner.
pub fn index(state: &AppState, actor: &User, params: &Params) -> ResultResp {
    let query = commission_query(params);
    let mut errors = Vec::new();

    let directory = Directory::load(state.api.as_ref()).unwrap_or_else(|e| {
        log::warn!("Directory unavailable: {e}");
        errors.push(format!("Could not load users and developments: {e}"));
        Directory::default()
    });
    let (sales, clients): (Vec<Sale>, Vec<Client>) =
        match (state.api.list_sales(), state.api.list_clients()) {
            (Ok(sales), Ok(clients)) => (sales, clients),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Sales unavailable: {e}");
                errors.push(format!("Could not load sales: {e}"));
                (Vec::new(), Vec::new())
            }
        };

    let scope = scope_filter(params);
    let filter = CommissionFilter {
        visibility: resolve_visibility(actor, &directory.users, &directory.teams, &scope),
        search: query.q.clone(),
        development_id: param(params, "development").map(str::to_string),
        status: param(params, "status").and_then(SaleStatus::parse),
        year: param(params, "year").and_then(|y| y.parse().ok()),
    };
    let rows = commission_rows(&sales, &clients, &directory.developments, &filter);
    let totals = commission_totals(&rows);

    let title = match actor.role {
        Role::Admin => "Commissions",
        Role::TeamLeader => "Team commissions",
        Role::Broker | Role::User => "My commissions",
    };
    let vm = CommissionsVm {
        actor,
        title,
        query: &query,
        rows,
        totals,
        years: sale_years(&sales),
        developments: &directory.developments,
        teams: &directory.teams,
        brokers: selectable_brokers(actor, &directory.users, &directory.teams, &scope),
        errors,
    };
    html_response(commissions_page(&vm))
}
