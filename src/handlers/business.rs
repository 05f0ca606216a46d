// src/handlers/business.rs

use crate::api::events::BusinessBook;
use crate::callmode::SessionLedger;
use crate::domain::datetime::parse_local;
use crate::domain::queue::{build_queue, QueueFilter};
use crate::domain::scope::{resolve_visibility, selectable_brokers, ScopeFilter};
use crate::domain::{Business, BusinessStatus, StatusUpdate, User};
use crate::errors::{FieldError, ServerError};
use crate::handlers::{scope_filter, Directory};
use crate::responses::{html_response_with_status, redirect, ResultResp};
use crate::router::{param, Params};
use crate::state::AppState;
use crate::templates::pages::{business_page, BusinessPageVm, BusinessRow};
use chrono::Utc;
use std::sync::Arc;

pub fn queue_filter(params: &Params) -> QueueFilter {
    QueueFilter {
        development_id: param(params, "development").map(str::to_string),
        status: param(params, "status").and_then(BusinessStatus::parse),
        search: param(params, "q").unwrap_or("").to_string(),
    }
}

pub fn index(state: &AppState, actor: &User, query: &Params) -> ResultResp {
    render(state, actor, query, &[], 200)
}

/// Renders the business table. Load failures end up in the banner instead of
/// failing the page.
pub fn render(
    state: &AppState,
    actor: &User,
    params: &Params,
    field_errors: &[FieldError],
    status: u16,
) -> ResultResp {
    let mut errors = Vec::new();

    let fetched = if param(params, "refresh") == Some("1") {
        state.refresh_book()
    } else {
        state.book()
    };
    let book = fetched.unwrap_or_else(|e| {
        log::warn!("Business list unavailable: {e}");
        errors.push(format!("Could not load businesses: {e}"));
        Arc::new(BusinessBook::default())
    });
    let directory = Directory::load(state.api.as_ref()).unwrap_or_else(|e| {
        log::warn!("Directory unavailable: {e}");
        errors.push(format!("Could not load users and developments: {e}"));
        Directory::default()
    });

    let filter = queue_filter(params);
    let scope = scope_filter(params);
    let visibility = resolve_visibility(actor, &directory.users, &directory.teams, &scope);

    let rows = build_queue(&book.businesses, &book.leads, &visibility, &filter)
        .into_iter()
        .map(|business| {
            let lead = book.lead(&business.lead_id);
            BusinessRow {
                lead_name: lead.map(|l| l.name.clone()).unwrap_or_default(),
                phone: lead.map(|l| l.phone.clone()).unwrap_or_default(),
                development: directory.development_name(&business.development_id),
                broker: directory.user_name(&business.broker_id),
                business,
            }
        })
        .collect();

    let vm = BusinessPageVm {
        actor,
        rows,
        developments: &directory.developments,
        teams: &directory.teams,
        brokers: selectable_brokers(actor, &directory.users, &directory.teams, &scope),
        filter: &filter,
        scope: &scope,
        errors,
        field_errors,
    };
    html_response_with_status(status, business_page(&vm))
}

/// Manual status edit from the table. Scheduled and recall need a date, either
/// submitted now or already on the business.
pub fn update_status(state: &AppState, actor: &User, id: &str, form: &Params) -> ResultResp {
    let business = visible_business(state, actor, id)?;

    let update = match status_update(&business, form) {
        Ok(update) => update,
        Err(ServerError::Validation(errors)) => {
            return render(state, actor, &Params::new(), &errors, 400)
        }
        Err(e) => return Err(e),
    };

    let saved = state.api.update_business(id, &update)?;
    state.remember_business(&saved)?;
    log::info!(
        "User {} set business {} to {}",
        actor.id,
        id,
        saved.status.as_str()
    );

    if saved.status != business.status {
        let ledger = SessionLedger::new(state.api.as_ref());
        if let Err(e) = ledger.record_manual_status(&actor.id, &saved, saved.status, Utc::now()) {
            log::warn!("Status change of {id} not counted in reports: {e}");
        }
    }

    redirect("/business")
}

pub fn delete(state: &AppState, actor: &User, id: &str) -> ResultResp {
    let business = visible_business(state, actor, id)?;
    state.api.delete_business(&business.id)?;
    state.forget_business(&business.id)?;
    log::info!("User {} deleted business {}", actor.id, business.id);
    redirect("/business")
}

/// The business with this id, if `actor` may see it.
fn visible_business(state: &AppState, actor: &User, id: &str) -> Result<Business, ServerError> {
    let book = state.book()?;
    let business = book
        .businesses
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .ok_or(ServerError::NotFound)?;

    let directory = Directory::load(state.api.as_ref())?;
    let visibility = resolve_visibility(
        actor,
        &directory.users,
        &directory.teams,
        &ScopeFilter::default(),
    );
    if !visibility.allows(&business.broker_id) {
        return Err(ServerError::Forbidden("business belongs to another broker".into()));
    }
    Ok(business)
}

fn status_update(
    business: &Business,
    form: &Params,
) -> Result<StatusUpdate, ServerError> {
    let status = param(form, "status")
        .and_then(BusinessStatus::parse)
        .ok_or_else(|| ServerError::validation("status", "choose a status"))?;
    let at = param(form, "at").and_then(parse_local);
    let notes = param(form, "notes").map(str::to_string);

    let update = StatusUpdate::manual(business, status, at, notes);
    let dated = update.scheduled_at.is_some() || update.recall_at.is_some();
    if matches!(status, BusinessStatus::Scheduled | BusinessStatus::Recall) && !dated {
        return Err(ServerError::validation("at", "choose a date and time"));
    }
    Ok(update)
}
