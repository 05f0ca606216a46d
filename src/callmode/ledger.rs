// src/callmode/ledger.rs

//! Durable record of call-mode sessions, written forward only.

use crate::api::CrmApi;
use crate::domain::{
    Business, BusinessStatus, CallCounters, CallModeSession, CallSessionPatch, NewCallSession,
};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};

pub struct SessionLedger<'a> {
    api: &'a dyn CrmApi,
}

impl<'a> SessionLedger<'a> {
    pub fn new(api: &'a dyn CrmApi) -> Self {
        Self { api }
    }

    /// Creates the session record for a new call-mode run.
    pub fn open(
        &self,
        user_id: &str,
        development_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CallModeSession, ServerError> {
        let session = self
            .api
            .create_call_session(&NewCallSession::opening(user_id, development_id, now))?;
        log::info!("Call-mode session {} opened by {}", session.id, user_id);
        Ok(session)
    }

    /// Overwrites the processed list and counters. Safe to repeat.
    pub fn record_progress(
        &self,
        session_id: &str,
        processed: &[String],
        counters: CallCounters,
    ) -> Result<(), ServerError> {
        self.api.update_call_session(
            session_id,
            &CallSessionPatch {
                end_time: None,
                business_viewed: processed.to_vec(),
                counters,
            },
        )
    }

    pub fn finalize(
        &self,
        session_id: &str,
        processed: &[String],
        counters: CallCounters,
        now: DateTime<Utc>,
    ) -> Result<(), ServerError> {
        self.api.update_call_session(
            session_id,
            &CallSessionPatch {
                end_time: Some(now),
                business_viewed: processed.to_vec(),
                counters,
            },
        )?;
        log::info!(
            "Call-mode session {} closed after {} calls",
            session_id,
            processed.len()
        );
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<CallModeSession>, ServerError> {
        self.api.list_call_sessions()
    }

    /// Records a status edit made outside call mode as a closed one-call session.
    /// Returns `None` for statuses that count nothing.
    pub fn record_manual_status(
        &self,
        user_id: &str,
        business: &Business,
        status: BusinessStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<CallModeSession>, ServerError> {
        let Some(counters) = manual_status_counters(status) else {
            return Ok(None);
        };
        let entry = NewCallSession {
            user_id: user_id.to_string(),
            development_id: Some(business.development_id.clone()),
            start_time: now,
            end_time: Some(now),
            business_viewed: vec![business.id.clone()],
            counters,
        };
        self.api.create_call_session(&entry).map(Some)
    }
}

/// Counters credited when a status is set by hand.
pub fn manual_status_counters(status: BusinessStatus) -> Option<CallCounters> {
    let mut c = CallCounters::default();
    match status {
        BusinessStatus::Whatsapp => c.whatsapp_calls = 1,
        BusinessStatus::Recall => {
            c.recall_calls = 1;
            c.talked_calls = 1;
        }
        BusinessStatus::Scheduled => {
            c.scheduled_calls = 1;
            c.talked_calls = 1;
        }
        BusinessStatus::Lost => c.not_interest_calls = 1,
        BusinessStatus::New => return None,
    }
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteCrm;
    use crate::domain::business::fixtures::{business, ts};
    use crate::tests::utils::init_test_db;

    #[test]
    fn manual_status_mapping() {
        let scheduled = manual_status_counters(BusinessStatus::Scheduled).unwrap();
        assert_eq!((scheduled.scheduled_calls, scheduled.talked_calls), (1, 1));
        assert_eq!(scheduled.total(), 2);

        let lost = manual_status_counters(BusinessStatus::Lost).unwrap();
        assert_eq!(lost.not_interest_calls, 1);
        assert_eq!(lost.total(), 1);

        assert!(manual_status_counters(BusinessStatus::New).is_none());
    }

    #[test]
    fn manual_entry_is_a_closed_single_call_session() {
        let (_dir, db) = init_test_db();
        let crm = SqliteCrm::new(db);
        let ledger = SessionLedger::new(&crm);
        let b = business("b1", "l1", BusinessStatus::New);

        let entry = ledger
            .record_manual_status("u1", &b, BusinessStatus::Recall, ts(3, 15))
            .unwrap()
            .expect("recall is counted");
        assert_eq!(entry.end_time, Some(ts(3, 15)));
        assert_eq!(entry.business_viewed, vec!["b1".to_string()]);
        assert_eq!(entry.counters.recall_calls, 1);

        assert!(ledger
            .record_manual_status("u1", &b, BusinessStatus::New, ts(3, 16))
            .unwrap()
            .is_none());
        assert_eq!(ledger.list().unwrap().len(), 1);
    }
}
