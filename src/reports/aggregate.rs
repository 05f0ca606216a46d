// src/reports/aggregate.rs

//! Totals over call-mode sessions for the reports page.

use crate::domain::scope::Visibility;
use crate::domain::{Business, CallCounters, CallModeSession, LeadSource};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    /// First day included, in the configured local offset.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
    pub utc_offset_minutes: i32,
    pub visibility: Visibility,
    pub source: Option<LeadSource>,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            utc_offset_minutes: 0,
            visibility: Visibility::Everyone,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportTotals {
    pub sessions: usize,
    /// Calls made, i.e. entries across all `businessViewed` lists.
    pub attempts: u32,
    pub counters: CallCounters,
}

impl ReportTotals {
    pub fn answer_rate(&self) -> f64 {
        ratio(self.counters.answered_calls, self.attempts)
    }

    pub fn talk_rate(&self) -> f64 {
        ratio(self.counters.talked_calls, self.counters.answered_calls)
    }

    pub fn schedule_rate(&self) -> f64 {
        ratio(self.counters.scheduled_calls, self.counters.talked_calls)
    }
}

fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole)
    }
}

/// Formats a ratio as a whole percentage.
pub fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Sessions that pass the filter, in input order.
pub fn select_sessions<'a>(
    sessions: &'a [CallModeSession],
    businesses: &[Business],
    filter: &ReportFilter,
) -> Vec<&'a CallModeSession> {
    let offset = FixedOffset::east_opt(filter.utc_offset_minutes * 60).unwrap_or(Utc.fix());
    let sources: HashMap<&str, LeadSource> = businesses
        .iter()
        .map(|b| (b.id.as_str(), b.source))
        .collect();

    sessions
        .iter()
        .filter(|s| filter.visibility.allows(&s.user_id))
        .filter(|s| {
            let day = s.start_time.with_timezone(&offset).date_naive();
            filter.from.map_or(true, |from| day >= from) && filter.to.map_or(true, |to| day <= to)
        })
        .filter(|s| match filter.source {
            None => true,
            Some(source) => s
                .business_viewed
                .iter()
                .any(|id| sources.get(id.as_str()) == Some(&source)),
        })
        .collect()
}

/// Sums counters and attempts over the selected sessions. Pure and repeatable.
pub fn aggregate(
    sessions: &[CallModeSession],
    businesses: &[Business],
    filter: &ReportFilter,
) -> ReportTotals {
    select_sessions(sessions, businesses, filter)
        .into_iter()
        .fold(ReportTotals::default(), |mut totals, s| {
            totals.sessions += 1;
            totals.attempts += s.business_viewed.len() as u32;
            totals.counters += s.counters;
            totals
        })
}
