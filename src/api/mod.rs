// src/api/mod.rs

//! Boundary to the CRM data service.
//!
//! Handlers and the call-mode walk only ever talk to [`CrmApi`]; whether the data
//! lives behind a REST service or in the bundled SQLite file is decided once in
//! `main`.

pub mod events;
pub mod rest;

use crate::domain::{
    Business, CallModeSession, CallSessionPatch, Client, Development, Lead, LeadUpdate,
    NewBusiness, NewCallSession, Sale, StatusUpdate, Team, User,
};
use crate::errors::ServerError;

pub use rest::RestClient;

pub trait CrmApi: Send + Sync {
    fn list_businesses(&self) -> Result<Vec<Business>, ServerError>;
    fn create_business(&self, new: &NewBusiness) -> Result<Business, ServerError>;
    fn update_business(&self, id: &str, update: &StatusUpdate) -> Result<Business, ServerError>;
    fn delete_business(&self, id: &str) -> Result<(), ServerError>;

    fn list_leads(&self) -> Result<Vec<Lead>, ServerError>;
    fn update_lead(&self, id: &str, update: &LeadUpdate) -> Result<Lead, ServerError>;

    fn create_call_session(&self, new: &NewCallSession) -> Result<CallModeSession, ServerError>;
    fn update_call_session(&self, id: &str, patch: &CallSessionPatch) -> Result<(), ServerError>;
    fn list_call_sessions(&self) -> Result<Vec<CallModeSession>, ServerError>;

    fn list_users(&self) -> Result<Vec<User>, ServerError>;
    fn list_teams(&self) -> Result<Vec<Team>, ServerError>;
    fn list_developments(&self) -> Result<Vec<Development>, ServerError>;

    fn list_sales(&self) -> Result<Vec<Sale>, ServerError>;
    fn list_clients(&self) -> Result<Vec<Client>, ServerError>;

    /// Checks credentials; `Ok(None)` when they are wrong.
    fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, ServerError>;

    fn find_user(&self, id: &str) -> Result<Option<User>, ServerError> {
        Ok(self.list_users()?.into_iter().find(|u| u.id == id))
    }
}
