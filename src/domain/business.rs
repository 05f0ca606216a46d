// src/domain/business.rs

use crate::domain::datetime::local_minutes;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Funnel position of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessStatus {
    New,
    Recall,
    Whatsapp,
    Scheduled,
    Lost,
}

impl BusinessStatus {
    pub const ALL: [BusinessStatus; 5] = [
        BusinessStatus::New,
        BusinessStatus::Recall,
        BusinessStatus::Whatsapp,
        BusinessStatus::Scheduled,
        BusinessStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BusinessStatus::New => "new",
            BusinessStatus::Recall => "recall",
            BusinessStatus::Whatsapp => "whatsapp",
            BusinessStatus::Scheduled => "scheduled",
            BusinessStatus::Lost => "lost",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessStatus::New => "New",
            BusinessStatus::Recall => "Recall",
            BusinessStatus::Whatsapp => "WhatsApp",
            BusinessStatus::Scheduled => "Scheduled",
            BusinessStatus::Lost => "Lost",
        }
    }
}

/// Channel a lead (and its businesses) came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadSource {
    Indication,
    Organic,
    Website,
    PaidTraffic,
    DoorToDoor,
    Tent,
    ImportedList,
}

impl LeadSource {
    pub const ALL: [LeadSource; 7] = [
        LeadSource::Indication,
        LeadSource::Organic,
        LeadSource::Website,
        LeadSource::PaidTraffic,
        LeadSource::DoorToDoor,
        LeadSource::Tent,
        LeadSource::ImportedList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadSource::Indication => "indication",
            LeadSource::Organic => "organic",
            LeadSource::Website => "website",
            LeadSource::PaidTraffic => "paidTraffic",
            LeadSource::DoorToDoor => "doorToDoor",
            LeadSource::Tent => "tent",
            LeadSource::ImportedList => "importedList",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadSource::Indication => "Indication",
            LeadSource::Organic => "Organic",
            LeadSource::Website => "Website",
            LeadSource::PaidTraffic => "Paid traffic",
            LeadSource::DoorToDoor => "Door to door",
            LeadSource::Tent => "Tent",
            LeadSource::ImportedList => "Imported list",
        }
    }
}

/// A lead's purchase interest in one development.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub lead_id: String,
    pub development_id: String,
    pub broker_id: String,
    pub source: LeadSource,
    pub status: BusinessStatus,
    #[serde(default, with = "local_minutes")]
    pub scheduled_at: Option<NaiveDateTime>,
    #[serde(default, with = "local_minutes")]
    pub recall_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub last_call_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBusiness {
    pub lead_id: String,
    pub development_id: String,
    pub broker_id: String,
    pub source: LeadSource,
    pub status: BusinessStatus,
    pub notes: Option<String>,
}

/// Status write for a business, sent with every field present so that
/// clearing `scheduledAt` / `recallAt` reaches the API as an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: BusinessStatus,
    #[serde(with = "local_minutes")]
    pub scheduled_at: Option<NaiveDateTime>,
    #[serde(with = "local_minutes")]
    pub recall_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub last_call_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    /// A manual status edit from the business table (no call involved).
    ///
    /// The date is kept only on the field matching the new status.
    pub fn manual(
        business: &Business,
        status: BusinessStatus,
        at: Option<NaiveDateTime>,
        notes: Option<String>,
    ) -> Self {
        let (scheduled_at, recall_at) = match status {
            BusinessStatus::Scheduled => (at.or(business.scheduled_at), None),
            BusinessStatus::Recall => (None, at.or(business.recall_at)),
            _ => (None, None),
        };
        Self {
            status,
            scheduled_at,
            recall_at,
            notes: notes.or_else(|| business.notes.clone()),
            last_call_at: business.last_call_at,
        }
    }

    /// Returns the business as it looks after this update was applied.
    pub fn apply_to(&self, business: &Business, now: DateTime<Utc>) -> Business {
        Business {
            status: self.status,
            scheduled_at: self.scheduled_at,
            recall_at: self.recall_at,
            notes: self.notes.clone(),
            last_call_at: self.last_call_at,
            updated_at: now,
            ..business.clone()
        }
    }
}
