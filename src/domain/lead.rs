// src/domain/lead.rs

use crate::domain::business::LeadSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub developments_interest: Vec<String>,
    pub broker_id: String,
    #[serde(default)]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<LeadSource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial lead write. Absent fields are left untouched by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
}

impl LeadUpdate {
    pub fn contacted_at(at: DateTime<Utc>) -> Self {
        Self {
            last_contact: Some(at),
            ..Default::default()
        }
    }

    pub fn rename(name: &str) -> Self {
        Self {
            name: Some(name.trim().to_string()),
            ..Default::default()
        }
    }
}

/// Digits-only phone rendered as `(DD) NNNNN-NNNN` / `(DD) NNNN-NNNN`.
/// Anything else is returned unchanged.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => raw.to_string(),
    }
}
