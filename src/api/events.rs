// src/api/events.rs

//! Push notifications from the CRM service and the snapshot they update.

use crate::domain::{Business, Lead};
use crate::errors::ServerError;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushEvent {
    NewBusiness(Business),
    NewLead(Lead),
}

impl PushEvent {
    pub fn parse(raw: &str) -> Result<Self, ServerError> {
        serde_json::from_str(raw)
            .map_err(|e| ServerError::BadRequest(format!("bad push event: {e}")))
    }
}

/// Immutable view of the businesses and leads a page works with.
/// Applying an event yields a new snapshot; the old one is untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessBook {
    pub businesses: Vec<Business>,
    pub leads: Vec<Lead>,
}

impl BusinessBook {
    pub fn new(businesses: Vec<Business>, leads: Vec<Lead>) -> Self {
        Self { businesses, leads }
    }

    /// New businesses go to the front, new leads to the back; ids already
    /// present are ignored.
    pub fn apply(&self, event: &PushEvent) -> Self {
        match event {
            PushEvent::NewBusiness(business) => {
                if self.businesses.iter().any(|b| b.id == business.id) {
                    return self.clone();
                }
                let mut businesses = Vec::with_capacity(self.businesses.len() + 1);
                businesses.push(business.clone());
                businesses.extend(self.businesses.iter().cloned());
                Self {
                    businesses,
                    leads: self.leads.clone(),
                }
            }
            PushEvent::NewLead(lead) => {
                if self.leads.iter().any(|l| l.id == lead.id) {
                    return self.clone();
                }
                let mut leads = self.leads.clone();
                leads.push(lead.clone());
                Self {
                    businesses: self.businesses.clone(),
                    leads,
                }
            }
        }
    }

    /// Snapshot with `updated` in place of the business sharing its id.
    pub fn with_business(&self, updated: &Business) -> Self {
        Self {
            businesses: self
                .businesses
                .iter()
                .map(|b| if b.id == updated.id { updated.clone() } else { b.clone() })
                .collect(),
            leads: self.leads.clone(),
        }
    }

    /// Snapshot with `updated` in place of the lead sharing its id.
    pub fn with_lead(&self, updated: &Lead) -> Self {
        Self {
            businesses: self.businesses.clone(),
            leads: self
                .leads
                .iter()
                .map(|l| if l.id == updated.id { updated.clone() } else { l.clone() })
                .collect(),
        }
    }

    pub fn without_business(&self, id: &str) -> Self {
        Self {
            businesses: self.businesses.iter().filter(|b| b.id != id).cloned().collect(),
            leads: self.leads.clone(),
        }
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }
}
