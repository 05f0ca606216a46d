// src/callmode/walk.rs

//! One user's pass through a call queue.
//!
//! The queue order is fixed when the walk starts. Each step classifies the
//! current call, writes the business, touches the lead and overwrites the
//! session's progress. The business write decides whether the step happened:
//! if it fails, nothing local changes and the same call can be submitted again.
//! Lead and session writes that fail afterwards are reported as warnings; the
//! session write carries the full state, so the next successful one catches up.

use crate::api::CrmApi;
use crate::callmode::ledger::SessionLedger;
use crate::domain::{
    classify, Business, BusinessStatus, CallCounters, CallOutcome, Lead, LeadUpdate,
};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// What the user submitted for the current call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallInput {
    pub outcome: CallOutcome,
    pub notes: String,
    /// Corrected lead name, if the user edited it during the call.
    pub lead_name: Option<String>,
}

/// Result of a step that was committed.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub business: Business,
    /// The lead as saved, `None` when its write failed.
    pub lead: Option<Lead>,
    /// Follow-up writes that failed after the business was saved.
    pub warnings: Vec<String>,
}

/// Final state handed back when a walk stops.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSummary {
    pub session_id: String,
    pub counters: CallCounters,
    pub calls: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// The call recorded on stop.
    pub last_call: StepReport,
    /// Every warning of the final step, session close included.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CallWalk {
    session_id: String,
    user_id: String,
    development_id: Option<String>,
    status_filter: Option<BusinessStatus>,
    queue: Vec<Business>,
    leads: HashMap<String, Lead>,
    cursor: usize,
    viewed: Vec<String>,
    processed: Vec<String>,
    counters: CallCounters,
    started_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    progress_pending: bool,
    closed: bool,
}

impl CallWalk {
    /// Opens the session record and positions the walk on the first business.
    pub fn start(
        api: &dyn CrmApi,
        user_id: &str,
        development_id: Option<String>,
        status_filter: Option<BusinessStatus>,
        queue: Vec<Business>,
        leads: &[Lead],
        now: DateTime<Utc>,
    ) -> Result<Self, ServerError> {
        let first = match queue.first() {
            Some(b) => b.id.clone(),
            None => {
                return Err(ServerError::validation(
                    "queue",
                    "no businesses match the selected filters",
                ))
            }
        };

        let session = SessionLedger::new(api).open(user_id, development_id.clone(), now)?;

        let leads = leads
            .iter()
            .filter(|l| queue.iter().any(|b| b.lead_id == l.id))
            .map(|l| (l.id.clone(), l.clone()))
            .collect();

        Ok(Self {
            session_id: session.id,
            user_id: user_id.to_string(),
            development_id,
            status_filter,
            queue,
            leads,
            cursor: 0,
            viewed: vec![first],
            processed: Vec::new(),
            counters: CallCounters::default(),
            started_at: now,
            last_activity: now,
            progress_pending: false,
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn current(&self) -> &Business {
        &self.queue[self.cursor]
    }

    pub fn current_lead(&self) -> Option<&Lead> {
        self.leads.get(&self.current().lead_id)
    }

    /// 1-based position and queue length.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor + 1, self.queue.len())
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.queue.len()
    }

    pub fn viewed(&self) -> &[String] {
        &self.viewed
    }

    pub fn processed(&self) -> &[String] {
        &self.processed
    }

    pub fn counters(&self) -> CallCounters {
        self.counters
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the cursor stays on the same business after this outcome.
    /// Unanswered calls in a queue of new businesses are worked again.
    fn holds(&self, outcome: &CallOutcome) -> bool {
        !outcome.is_answered() && self.status_filter == Some(BusinessStatus::New)
    }

    /// Records the current call and moves on. Refused on the last business;
    /// use [`CallWalk::stop`] there.
    pub fn advance(
        &mut self,
        api: &dyn CrmApi,
        input: &CallInput,
        now: DateTime<Utc>,
    ) -> Result<StepReport, ServerError> {
        if self.closed {
            return Err(ServerError::NotFound);
        }
        self.last_activity = now;
        if self.is_last() {
            return Err(ServerError::BadRequest(
                "this is the last business of the queue, stop the session instead".into(),
            ));
        }

        let mut report = self.record_call(api, input, now)?;

        if !self.holds(&input.outcome) {
            self.cursor += 1;
        }
        let next = self.current().id.clone();
        if !self.viewed.contains(&next) {
            self.viewed.push(next);
        }

        if let Err(e) = SessionLedger::new(api).record_progress(
            &self.session_id,
            &self.processed,
            self.counters,
        ) {
            self.progress_pending = true;
            log::warn!("Session {} progress not saved: {e}", self.session_id);
            report.warnings.push(format!("Session progress not saved: {e}"));
        } else {
            self.progress_pending = false;
        }

        Ok(report)
    }

    /// Records the current call and closes the session.
    pub fn stop(
        &mut self,
        api: &dyn CrmApi,
        input: &CallInput,
        now: DateTime<Utc>,
    ) -> Result<WalkSummary, ServerError> {
        if self.closed {
            return Err(ServerError::NotFound);
        }
        self.last_activity = now;
        let last_call = self.record_call(api, input, now)?;
        self.closed = true;
        let mut warnings = last_call.warnings.clone();

        if let Err(e) =
            SessionLedger::new(api).finalize(&self.session_id, &self.processed, self.counters, now)
        {
            log::warn!("Session {} could not be closed: {e}", self.session_id);
            warnings.push(format!("Session could not be closed: {e}"));
        }
        self.progress_pending = false;

        Ok(WalkSummary {
            session_id: self.session_id.clone(),
            counters: self.counters,
            calls: self.processed.len(),
            started_at: self.started_at,
            ended_at: now,
            last_call,
            warnings,
        })
    }

    /// Closes the session record with the calls made so far, without
    /// recording another one. Later steps on this walk are refused.
    pub fn close(&mut self, api: &dyn CrmApi, now: DateTime<Utc>) -> Result<(), ServerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        SessionLedger::new(api).finalize(&self.session_id, &self.processed, self.counters, now)?;
        self.progress_pending = false;
        Ok(())
    }

    pub fn has_unsaved_progress(&self) -> bool {
        self.progress_pending
    }

    /// Classify, save the business, then the lead. Local state changes only
    /// once the business is saved.
    fn record_call(
        &mut self,
        api: &dyn CrmApi,
        input: &CallInput,
        now: DateTime<Utc>,
    ) -> Result<StepReport, ServerError> {
        let current = self.current().clone();
        let update = classify(&current, &input.outcome, &input.notes, now);

        let saved = api.update_business(&current.id, &update)?;
        self.queue[self.cursor] = saved.clone();
        self.processed.push(current.id.clone());
        let before = self.counters;
        self.counters += input.outcome.counter_increments();
        debug_assert!(self.counters.dominates(&before));

        let mut warnings = Vec::new();
        let renamed = input
            .lead_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .filter(|n| self.leads.get(&current.lead_id).map_or(true, |l| l.name != *n));
        let lead_update = match renamed {
            Some(name) => LeadUpdate {
                last_contact: Some(now),
                ..LeadUpdate::rename(name)
            },
            None => LeadUpdate::contacted_at(now),
        };
        let lead = match api.update_lead(&current.lead_id, &lead_update) {
            Ok(lead) => {
                self.leads.insert(lead.id.clone(), lead.clone());
                Some(lead)
            }
            Err(e) => {
                log::warn!("Lead {} not updated after call: {e}", current.lead_id);
                warnings.push(format!("Lead not updated: {e}"));
                None
            }
        };

        Ok(StepReport {
            business: saved,
            lead,
            warnings,
        })
    }
}
