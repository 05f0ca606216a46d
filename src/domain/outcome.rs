// src/domain/outcome.rs

//! Outcome of a single call and what it does to the business and the counters.
//!
//! The call-mode form used to carry nine independent toggles. They are folded
//! into one [`CallOutcome`] before anything else looks at them, so every call has
//! exactly one terminal classification.

use crate::domain::business::{Business, BusinessStatus, StatusUpdate};
use crate::domain::call_session::CallCounters;
use crate::domain::datetime::parse_local;
use crate::errors::ServerError;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Why nobody answered (or what was done instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoAnswer {
    /// Rang out with nothing else to record.
    Rang,
    Voicemail,
    InvalidNumber,
    NotReceivingCalls,
    /// Followed up over WhatsApp instead.
    Whatsapp,
}

/// What came out of an answered call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerResult {
    Nothing,
    Scheduled(NaiveDateTime),
    Recall(NaiveDateTime),
    NotInterested,
    Whatsapp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Unanswered(NoAnswer),
    Answered { talked: bool, result: AnswerResult },
}

impl Default for CallOutcome {
    fn default() -> Self {
        CallOutcome::Unanswered(NoAnswer::Rang)
    }
}

impl CallOutcome {
    /// Answered call; a scheduled visit always implies the lead talked.
    pub fn answered(talked: bool, result: AnswerResult) -> Self {
        let talked = talked || matches!(result, AnswerResult::Scheduled(_));
        CallOutcome::Answered { talked, result }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, CallOutcome::Answered { .. })
    }

    /// Status the business moves to, `None` when it stays as it was.
    pub fn target_status(&self) -> Option<BusinessStatus> {
        match self {
            CallOutcome::Unanswered(NoAnswer::Whatsapp) => Some(BusinessStatus::Whatsapp),
            CallOutcome::Unanswered(_) => None,
            CallOutcome::Answered { result, .. } => match result {
                AnswerResult::Nothing => None,
                AnswerResult::Scheduled(_) => Some(BusinessStatus::Scheduled),
                AnswerResult::Recall(_) => Some(BusinessStatus::Recall),
                AnswerResult::NotInterested => Some(BusinessStatus::Lost),
                AnswerResult::Whatsapp => Some(BusinessStatus::Whatsapp),
            },
        }
    }

    /// Counters this call adds to its session. Every counter moves by at most one.
    pub fn counter_increments(&self) -> CallCounters {
        let mut c = CallCounters::default();
        match *self {
            CallOutcome::Answered { talked, result } => {
                c.answered_calls = 1;
                if talked {
                    c.talked_calls = 1;
                }
                match result {
                    AnswerResult::Scheduled(_) => c.scheduled_calls = 1,
                    AnswerResult::Recall(_) => c.recall_calls = 1,
                    AnswerResult::NotInterested => c.not_interest_calls = 1,
                    AnswerResult::Whatsapp => c.whatsapp_calls = 1,
                    AnswerResult::Nothing => {}
                }
            }
            CallOutcome::Unanswered(reason) => match reason {
                NoAnswer::Voicemail => c.voicemail_calls = 1,
                NoAnswer::Whatsapp => c.whatsapp_calls = 1,
                NoAnswer::InvalidNumber => c.invalid_number_calls = 1,
                NoAnswer::NotReceivingCalls => c.not_receiving_calls = 1,
                NoAnswer::Rang => {}
            },
        }
        c
    }

    /// Value of the single outcome control in the call-mode form.
    pub fn form_value(&self) -> &'static str {
        match self {
            CallOutcome::Unanswered(NoAnswer::Rang) => "no_answer",
            CallOutcome::Unanswered(NoAnswer::Voicemail) => "voicemail",
            CallOutcome::Unanswered(NoAnswer::InvalidNumber) => "invalid_number",
            CallOutcome::Unanswered(NoAnswer::NotReceivingCalls) => "not_receiving",
            CallOutcome::Unanswered(NoAnswer::Whatsapp) => "whatsapp_no_answer",
            CallOutcome::Answered { result, .. } => match result {
                AnswerResult::Nothing => "answered",
                AnswerResult::Scheduled(_) => "scheduled",
                AnswerResult::Recall(_) => "recall",
                AnswerResult::NotInterested => "not_interested",
                AnswerResult::Whatsapp => "whatsapp",
            },
        }
    }

    /// Parses the call-mode form: one outcome choice, a "talked" checkbox and the
    /// date for scheduled/recall outcomes.
    pub fn from_form(choice: &str, talked: bool, at: Option<&str>) -> Result<Self, ServerError> {
        let outcome = match choice {
            "" | "no_answer" => CallOutcome::Unanswered(NoAnswer::Rang),
            "voicemail" => CallOutcome::Unanswered(NoAnswer::Voicemail),
            "invalid_number" => CallOutcome::Unanswered(NoAnswer::InvalidNumber),
            "not_receiving" => CallOutcome::Unanswered(NoAnswer::NotReceivingCalls),
            "whatsapp_no_answer" => CallOutcome::Unanswered(NoAnswer::Whatsapp),
            "answered" => CallOutcome::answered(talked, AnswerResult::Nothing),
            "scheduled" => CallOutcome::answered(true, AnswerResult::Scheduled(required_at(at)?)),
            "recall" => CallOutcome::answered(talked, AnswerResult::Recall(required_at(at)?)),
            "not_interested" => CallOutcome::answered(talked, AnswerResult::NotInterested),
            "whatsapp" => CallOutcome::answered(talked, AnswerResult::Whatsapp),
            other => {
                return Err(ServerError::validation(
                    "outcome",
                    format!("unknown outcome '{other}'"),
                ))
            }
        };
        Ok(outcome)
    }
}

fn required_at(at: Option<&str>) -> Result<NaiveDateTime, ServerError> {
    at.and_then(parse_local)
        .ok_or_else(|| ServerError::validation("at", "choose a date and time"))
}

/// The nine independent switches of the call screen plus its date input.
///
/// Accepted from clients that still post the switches instead of a single
/// outcome; [`OutcomeToggles::resolve`] turns them into a [`CallOutcome`] with a
/// fixed precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeToggles {
    pub answered: bool,
    pub talked: bool,
    pub scheduled: bool,
    pub rescheduled: bool,
    pub whatsapp: bool,
    pub not_interested: bool,
    pub voicemail: bool,
    pub number_not_exists: bool,
    pub not_receiving_calls: bool,
    pub scheduled_date_time: Option<String>,
}

impl OutcomeToggles {
    /// Precedence when several switches are on:
    /// unanswered: whatsapp > voicemail > invalid number > not receiving;
    /// answered: whatsapp > scheduled (needs talked) > recall > not interested.
    pub fn resolve(&self) -> Result<CallOutcome, ServerError> {
        if !self.answered {
            let reason = if self.whatsapp {
                NoAnswer::Whatsapp
            } else if self.voicemail {
                NoAnswer::Voicemail
            } else if self.number_not_exists {
                NoAnswer::InvalidNumber
            } else if self.not_receiving_calls {
                NoAnswer::NotReceivingCalls
            } else {
                NoAnswer::Rang
            };
            return Ok(CallOutcome::Unanswered(reason));
        }

        let at = self.scheduled_date_time.as_deref();
        let result = if self.whatsapp {
            AnswerResult::Whatsapp
        } else if self.talked && self.scheduled {
            AnswerResult::Scheduled(required_at(at)?)
        } else if self.rescheduled {
            AnswerResult::Recall(required_at(at)?)
        } else if self.not_interested {
            AnswerResult::NotInterested
        } else {
            AnswerResult::Nothing
        };
        Ok(CallOutcome::answered(self.talked, result))
    }
}

/// Status, dates and notes to write back to the business after a call.
///
/// `scheduled_at` is set iff the resulting status is scheduled and `recall_at`
/// iff it is recall. When the status does not change, the dates the business
/// already had are carried over.
pub fn classify(
    business: &Business,
    outcome: &CallOutcome,
    notes: &str,
    now: DateTime<Utc>,
) -> StatusUpdate {
    let (status, scheduled_at, recall_at) = match (outcome.target_status(), outcome) {
        (
            Some(BusinessStatus::Scheduled),
            CallOutcome::Answered {
                result: AnswerResult::Scheduled(at),
                ..
            },
        ) => (BusinessStatus::Scheduled, Some(*at), None),
        (
            Some(BusinessStatus::Recall),
            CallOutcome::Answered {
                result: AnswerResult::Recall(at),
                ..
            },
        ) => (BusinessStatus::Recall, None, Some(*at)),
        (Some(status), _) => (status, None, None),
        (None, _) => (business.status, business.scheduled_at, business.recall_at),
    };

    StatusUpdate {
        status,
        scheduled_at: if status == BusinessStatus::Scheduled {
            scheduled_at
        } else {
            None
        },
        recall_at: if status == BusinessStatus::Recall {
            recall_at
        } else {
            None
        },
        notes: Some(notes.to_string()),
        last_call_at: Some(now),
    }
}
