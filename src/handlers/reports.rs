use crate::callmode::SessionLedger;
use crate::domain::scope::{resolve_visibility, selectable_brokers};
use crate::domain::{LeadSource, User};
use crate::errors::ServerError;
use crate::handlers::{scope_filter, Directory};
use crate::reports::{aggregate, report_workbook, select_sessions, ReportFilter, ReportTotals};
use crate::responses::{html_response, xlsx_response, ResultResp};
use crate::router::{param, Params};
use crate::state::AppState;
use crate::templates::pages::{reports_page, ReportQuery, ReportsVm};
use chrono::NaiveDate;

fn report_query(params: &Params) -> ReportQuery {
    let get = |key: &str| param(params, key).unwrap_or("").to_string();
    ReportQuery {
        from: get("from"),
        to: get("to"),
        team: get("team"),
        broker: get("broker"),
        source: get("source"),
    }
}

fn parse_day(raw: &str, field: &str) -> Result<Option<NaiveDate>, ServerError> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ServerError::BadRequest(format!("'{raw}' is not a valid {field} date")))
}

/// Report filter for the actor. Team and broker picks are narrowed by role.
fn report_filter(
    state: &AppState,
    actor: &User,
    params: &Params,
    directory: &Directory,
) -> Result<ReportFilter, ServerError> {
    let query = report_query(params);
    let scope = scope_filter(params);
    Ok(ReportFilter {
        from: parse_day(&query.from, "start")?,
        to: parse_day(&query.to, "end")?,
        utc_offset_minutes: state.config.utc_offset_minutes,
        visibility: resolve_visibility(actor, &directory.users, &directory.teams, &scope),
        source: LeadSource::parse(&query.source),
    })
}

pub fn index(state: &AppState, actor: &User, params: &Params) -> ResultResp {
    let query = report_query(params);
    let mut errors = Vec::new();

    let directory = Directory::load(state.api.as_ref()).unwrap_or_else(|e| {
        errors.push(format!("Could not load users and teams: {e}"));
        Directory::default()
    });

    let totals = match report_filter(state, actor, params, &directory) {
        Ok(filter) => {
            let sessions = SessionLedger::new(state.api.as_ref()).list();
            let businesses = state.book().map(|book| book.businesses.clone());
            match (sessions, businesses) {
                (Ok(sessions), Ok(businesses)) => aggregate(&sessions, &businesses, &filter),
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("Report data unavailable: {e}");
                    errors.push(format!("Could not load call sessions: {e}"));
                    ReportTotals::default()
                }
            }
        }
        Err(e) => {
            errors.push(e.to_string());
            ReportTotals::default()
        }
    };

    let scope = scope_filter(params);
    let vm = ReportsVm {
        actor,
        query: &query,
        totals,
        teams: &directory.teams,
        brokers: selectable_brokers(actor, &directory.users, &directory.teams, &scope),
        errors,
    };
    html_response(reports_page(&vm))
}

pub fn export(state: &AppState, actor: &User, params: &Params) -> ResultResp {
    let directory = Directory::load(state.api.as_ref())?;
    let filter = report_filter(state, actor, params, &directory)?;
    let sessions = SessionLedger::new(state.api.as_ref()).list()?;
    let book = state.book()?;

    let totals = aggregate(&sessions, &book.businesses, &filter);
    let selected = select_sessions(&sessions, &book.businesses, &filter);
    let buffer = report_workbook(&totals, &selected, &directory.users, &directory.developments)?;

    log::info!("User {} exported {} sessions", actor.id, selected.len());
    xlsx_response(buffer, "call-report.xlsx")
}
