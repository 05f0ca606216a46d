// src/handlers/call_mode.rs

//! Call-mode pages: start a walk from the business filters, record each call,
//! stop. Walks live in `AppState` between requests.

use crate::callmode::{CallInput, CallWalk, StepReport};
use crate::domain::queue::build_queue;
use crate::domain::scope::resolve_visibility;
use crate::domain::{CallOutcome, OutcomeToggles, User};
use crate::errors::{FieldError, ServerError};
use crate::handlers::business::{self, queue_filter};
use crate::handlers::{scope_filter, Directory};
use crate::responses::{html_response, html_response_with_status, redirect, status_code, ResultResp};
use crate::router::{param, Params};
use crate::state::AppState;
use crate::templates::pages::{call_screen, summary_page, CallScreenVm};
use chrono::Utc;

pub fn start(state: &AppState, actor: &User, form: &Params) -> ResultResp {
    let filter = queue_filter(form);
    let scope = scope_filter(form);
    if let Err(e) = filter.validate_for_call_mode() {
        return business::render(state, actor, form, e.field_errors(), 400);
    }

    let book = state.book()?;
    let directory = Directory::load(state.api.as_ref())?;
    let visibility = resolve_visibility(actor, &directory.users, &directory.teams, &scope);
    let queue = build_queue(&book.businesses, &book.leads, &visibility, &filter);

    let now = Utc::now();
    let walk = match CallWalk::start(
        state.api.as_ref(),
        &actor.id,
        filter.development_id.clone(),
        filter.status,
        queue,
        &book.leads,
        now,
    ) {
        Ok(walk) => walk,
        Err(ServerError::Validation(errors)) => {
            return business::render(state, actor, form, &errors, 400)
        }
        Err(e) => return Err(e),
    };

    log::info!(
        "User {} started call mode with {} businesses",
        actor.id,
        walk.position().1
    );
    let session_id = state.insert_walk(walk, now)?;
    redirect(&format!("/call-mode/{session_id}"))
}

pub fn screen(state: &AppState, actor: &User, session_id: &str) -> ResultResp {
    let walk = state.walk_for(session_id, &actor.id)?;
    let mut walk = walk.lock().map_err(|_| ServerError::InternalError)?;
    if walk.is_closed() {
        return Err(ServerError::NotFound);
    }
    walk.touch(Utc::now());
    render_screen(state, actor, &walk, Vec::new(), &[], 200)
}

pub fn next(state: &AppState, actor: &User, session_id: &str, form: &Params) -> ResultResp {
    let walk = state.walk_for(session_id, &actor.id)?;
    let mut walk = walk.lock().map_err(|_| ServerError::InternalError)?;
    if walk.is_closed() {
        return Err(ServerError::NotFound);
    }

    let input = match call_input(form) {
        Ok(input) => input,
        Err(e) => return render_screen(state, actor, &walk, Vec::new(), e.field_errors(), 400),
    };

    match walk.advance(state.api.as_ref(), &input, Utc::now()) {
        Ok(report) => {
            remember(state, &report)?;
            if report.warnings.is_empty() {
                redirect(&format!("/call-mode/{session_id}"))
            } else {
                render_screen(state, actor, &walk, report.warnings, &[], 200)
            }
        }
        Err(e) => {
            log::warn!("Call in session {session_id} not recorded: {e}");
            let status = status_code(&e);
            render_screen(state, actor, &walk, vec![e.to_string()], e.field_errors(), status)
        }
    }
}

pub fn stop(state: &AppState, actor: &User, session_id: &str, form: &Params) -> ResultResp {
    let walk = state.walk_for(session_id, &actor.id)?;
    let mut walk = walk.lock().map_err(|_| ServerError::InternalError)?;
    if walk.is_closed() {
        return Err(ServerError::NotFound);
    }

    let input = match call_input(form) {
        Ok(input) => input,
        Err(e) => return render_screen(state, actor, &walk, Vec::new(), e.field_errors(), 400),
    };

    match walk.stop(state.api.as_ref(), &input, Utc::now()) {
        Ok(summary) => {
            drop(walk);
            state.remove_walk(session_id)?;
            remember(state, &summary.last_call)?;
            log::info!(
                "User {} finished call mode: {} calls",
                actor.id,
                summary.calls
            );
            html_response(summary_page(actor, &summary))
        }
        Err(e) => {
            log::warn!("Session {session_id} not stopped: {e}");
            let status = status_code(&e);
            render_screen(state, actor, &walk, vec![e.to_string()], e.field_errors(), status)
        }
    }
}

/// Parses the call form. Missing outcome reads as "no answer"; a form with
/// the older per-outcome switches instead of `outcome` is resolved from those.
pub fn call_input(form: &Params) -> Result<CallInput, ServerError> {
    let outcome = if !form.contains_key("outcome") && form.contains_key("answered") {
        toggles(form).resolve()?
    } else {
        CallOutcome::from_form(
            param(form, "outcome").unwrap_or(""),
            form.contains_key("talked"),
            param(form, "at"),
        )?
    };
    Ok(CallInput {
        outcome,
        notes: form.get("notes").cloned().unwrap_or_default(),
        lead_name: param(form, "lead_name").map(str::to_string),
    })
}

fn toggles(form: &Params) -> OutcomeToggles {
    let on = |key: &str| matches!(param(form, key), Some("1" | "true" | "on"));
    OutcomeToggles {
        answered: on("answered"),
        talked: on("talked"),
        scheduled: on("scheduled"),
        rescheduled: on("rescheduled"),
        whatsapp: on("whatsapp"),
        not_interested: on("not_interested"),
        voicemail: on("voicemail"),
        number_not_exists: on("number_not_exists"),
        not_receiving_calls: on("not_receiving_calls"),
        scheduled_date_time: param(form, "at").map(str::to_string),
    }
}

fn remember(state: &AppState, report: &StepReport) -> Result<(), ServerError> {
    state.remember_business(&report.business)?;
    if let Some(lead) = &report.lead {
        state.remember_lead(lead)?;
    }
    Ok(())
}

fn render_screen(
    state: &AppState,
    actor: &User,
    walk: &CallWalk,
    warnings: Vec<String>,
    field_errors: &[FieldError],
    status: u16,
) -> ResultResp {
    let business = walk.current();
    let lead = walk.current_lead();
    let mut warnings = warnings;
    if walk.has_unsaved_progress() && warnings.is_empty() {
        warnings.push(
            "Session progress is not saved yet; it is sent again with the next call.".into(),
        );
    }
    let development = state
        .api
        .list_developments()
        .ok()
        .and_then(|devs| devs.into_iter().find(|d| d.id == business.development_id))
        .map(|d| d.name)
        .unwrap_or_else(|| business.development_id.clone());

    let vm = CallScreenVm {
        actor,
        session_id: walk.session_id(),
        position: walk.position(),
        business,
        lead_name: lead.map(|l| l.name.clone()).unwrap_or_default(),
        phone: lead.map(|l| l.phone.clone()).unwrap_or_default(),
        development,
        elapsed_secs: (Utc::now() - walk.started_at()).num_seconds(),
        counters: walk.counters(),
        is_last: walk.is_last(),
        warnings,
        field_errors,
    };
    html_response_with_status(status, call_screen(&vm))
}
