// src/domain/queue.rs

//! Builds the ordered list of businesses a call-mode session walks through.

use crate::domain::business::{Business, BusinessStatus};
use crate::domain::lead::Lead;
use crate::domain::scope::Visibility;
use crate::errors::{FieldError, ServerError};
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    pub development_id: Option<String>,
    pub status: Option<BusinessStatus>,
    /// Lead name search, case and accent insensitive.
    pub search: String,
}

impl QueueFilter {
    /// Call mode needs both a development and a status picked.
    pub fn validate_for_call_mode(&self) -> Result<(), ServerError> {
        let mut errors = Vec::new();
        if self.development_id.is_none() {
            errors.push(FieldError::new("development", "select a development"));
        }
        if self.status.is_none() {
            errors.push(FieldError::new("status", "select a status"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Validation(errors))
        }
    }
}

/// Lowercases and drops combining marks after canonical decomposition, so
/// precomposed and decomposed spellings fold to the same text.
pub fn fold_accents(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Filters businesses to those visible, matching the filter and tied to a known
/// lead.
///
/// For the `new` status the queue puts never-called businesses first (newest
/// first), then the rest by how long ago they were last called.
pub fn build_queue(
    businesses: &[Business],
    leads: &[Lead],
    visibility: &Visibility,
    filter: &QueueFilter,
) -> Vec<Business> {
    let leads_by_id: HashMap<&str, &Lead> = leads.iter().map(|l| (l.id.as_str(), l)).collect();
    let needle = fold_accents(filter.search.trim());

    let mut queue: Vec<Business> = businesses
        .iter()
        .filter(|b| visibility.allows(&b.broker_id))
        .filter(|b| match leads_by_id.get(b.lead_id.as_str()) {
            Some(lead) => fold_accents(&lead.name).contains(&needle),
            None => false,
        })
        .filter(|b| {
            filter
                .development_id
                .as_deref()
                .map_or(true, |d| b.development_id == d)
        })
        .filter(|b| filter.status.map_or(true, |s| b.status == s))
        .cloned()
        .collect();

    if filter.status == Some(BusinessStatus::New) {
        let (mut never_called, mut called): (Vec<_>, Vec<_>) =
            queue.into_iter().partition(|b| b.last_call_at.is_none());
        never_called.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        called.sort_by_key(|b| b.last_call_at);
        never_called.extend(called);
        queue = never_called;
    }

    queue
}
