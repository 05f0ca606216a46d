// src/domain/call_session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Per-outcome call counters of a call-mode session.
/// Missing fields in API payloads read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallCounters {
    pub answered_calls: u32,
    pub talked_calls: u32,
    pub scheduled_calls: u32,
    pub whatsapp_calls: u32,
    pub not_interest_calls: u32,
    pub recall_calls: u32,
    pub voicemail_calls: u32,
    pub invalid_number_calls: u32,
    pub not_receiving_calls: u32,
}

impl CallCounters {
    /// `(label, value)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, u32); 9] {
        [
            ("Answered", self.answered_calls),
            ("Talked", self.talked_calls),
            ("Scheduled", self.scheduled_calls),
            ("WhatsApp", self.whatsapp_calls),
            ("Not interested", self.not_interest_calls),
            ("Recall", self.recall_calls),
            ("Voicemail", self.voicemail_calls),
            ("Invalid number", self.invalid_number_calls),
            ("Not receiving calls", self.not_receiving_calls),
        ]
    }

    pub fn total(&self) -> u32 {
        self.entries().iter().map(|(_, v)| v).sum()
    }

    /// True when no counter of `self` is below the matching counter of `earlier`.
    pub fn dominates(&self, earlier: &CallCounters) -> bool {
        self.entries()
            .iter()
            .zip(earlier.entries().iter())
            .all(|((_, now), (_, before))| now >= before)
    }
}

impl AddAssign for CallCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.answered_calls += rhs.answered_calls;
        self.talked_calls += rhs.talked_calls;
        self.scheduled_calls += rhs.scheduled_calls;
        self.whatsapp_calls += rhs.whatsapp_calls;
        self.not_interest_calls += rhs.not_interest_calls;
        self.recall_calls += rhs.recall_calls;
        self.voicemail_calls += rhs.voicemail_calls;
        self.invalid_number_calls += rhs.invalid_number_calls;
        self.not_receiving_calls += rhs.not_receiving_calls;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallModeSession {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub development_id: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// One entry per processed call, duplicates possible when a call is retried.
    #[serde(default)]
    pub business_viewed: Vec<String>,
    #[serde(flatten)]
    pub counters: CallCounters,
}

/// Session record as sent on creation; the API assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCallSession {
    pub user_id: String,
    pub development_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub business_viewed: Vec<String>,
    #[serde(flatten)]
    pub counters: CallCounters,
}

impl NewCallSession {
    /// A fresh call-mode run: zero counters, nothing viewed.
    pub fn opening(user_id: &str, development_id: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            development_id,
            start_time: now,
            end_time: None,
            business_viewed: Vec::new(),
            counters: CallCounters::default(),
        }
    }
}

/// Forward-only session write: progress after each call, `end_time` on stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSessionPatch {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<DateTime<Utc>>,
    pub business_viewed: Vec<String>,
    #[serde(flatten)]
    pub counters: CallCounters,
}
