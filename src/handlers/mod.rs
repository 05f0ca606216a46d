// src/handlers/mod.rs

//! Request handlers, one module per page. Each takes the already-decoded
//! params from the router and returns a response or a `ServerError` for the
//! error page.

pub mod auth;
pub mod business;
pub mod call_mode;
pub mod commissions;
pub mod events;
pub mod reports;

use crate::api::CrmApi;
use crate::domain::scope::ScopeFilter;
use crate::domain::{Development, Team, User};
use crate::errors::ServerError;
use crate::router::{param, Params};

/// Users, teams and developments, loaded together for pickers and scoping.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub developments: Vec<Development>,
}

impl Directory {
    pub fn load(api: &dyn CrmApi) -> Result<Self, ServerError> {
        Ok(Self {
            users: api.list_users()?,
            teams: api.list_teams()?,
            developments: api.list_developments()?,
        })
    }

    pub fn user_name(&self, id: &str) -> String {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn development_name(&self, id: &str) -> String {
        self.developments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}

pub fn scope_filter(params: &Params) -> ScopeFilter {
    ScopeFilter {
        team_id: param(params, "team").map(str::to_string),
        broker_id: param(params, "broker").map(str::to_string),
    }
}
