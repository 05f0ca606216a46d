// src/db/store.rs

//! [`CrmApi`] over the bundled SQLite schema, for deployments without a remote
//! CRM service.

use crate::api::CrmApi;
use crate::auth::password::{hash_password, verify_password, PasswordCost};
use crate::db::{businesses, call_sessions, directory, leads, sales, Database};
use crate::domain::{
    Business, CallModeSession, CallSessionPatch, Client, Development, Lead, LeadUpdate,
    NewBusiness, NewCallSession, Sale, StatusUpdate, Team, User,
};
use crate::errors::ServerError;
use chrono::Utc;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct SqliteCrm {
    db: Database,
    password_cost: PasswordCost,
}

impl SqliteCrm {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            password_cost: PasswordCost::default(),
        }
    }

    /// Argon2 cost for passwords hashed from now on.
    pub fn with_password_cost(mut self, cost: PasswordCost) -> Self {
        self.password_cost = cost;
        self
    }

    /// Adds a user who can sign in with `password`.
    pub fn add_user(&self, user: &User, password: &str) -> Result<(), ServerError> {
        let hash = hash_password(&self.password_cost, password)?;
        let user = User {
            email: normalize_email(&user.email),
            ..user.clone()
        };
        self.db
            .with_conn(|conn| directory::insert_user(conn, &user, Some(hash.as_str())))
    }

    pub fn add_team(&self, team: &Team) -> Result<(), ServerError> {
        self.db.with_conn(|conn| directory::insert_team(conn, team))
    }

    pub fn add_development(&self, dev: &Development) -> Result<(), ServerError> {
        self.db.with_conn(|conn| directory::insert_development(conn, dev))
    }

    pub fn add_lead(&self, lead: &Lead) -> Result<(), ServerError> {
        self.db.with_conn(|conn| leads::insert_lead(conn, lead))
    }

    pub fn add_client(&self, client: &Client) -> Result<(), ServerError> {
        self.db.with_conn(|conn| sales::insert_client(conn, client))
    }

    pub fn add_sale(&self, sale: &Sale) -> Result<(), ServerError> {
        self.db.with_conn(|conn| sales::insert_sale(conn, sale))
    }

    pub fn count_users(&self) -> Result<i64, ServerError> {
        self.db.with_conn(|conn| {
            Ok(conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?)
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CrmApi for SqliteCrm {
    fn list_businesses(&self) -> Result<Vec<Business>, ServerError> {
        self.db.with_conn(|conn| businesses::list_businesses(conn))
    }

    fn create_business(&self, new: &NewBusiness) -> Result<Business, ServerError> {
        let id = Uuid::new_v4().to_string();
        self.db.with_conn(|conn| {
            businesses::insert_business(conn, &id, new, Utc::now())?;
            businesses::get_business(conn, &id)?.ok_or(ServerError::InternalError)
        })
    }

    fn update_business(&self, id: &str, update: &StatusUpdate) -> Result<Business, ServerError> {
        self.db.with_conn(|conn| {
            if !businesses::update_status(conn, id, update, Utc::now())? {
                return Err(ServerError::NotFound);
            }
            businesses::get_business(conn, id)?.ok_or(ServerError::NotFound)
        })
    }

    fn delete_business(&self, id: &str) -> Result<(), ServerError> {
        self.db.with_conn(|conn| {
            if businesses::delete_business(conn, id)? {
                Ok(())
            } else {
                Err(ServerError::NotFound)
            }
        })
    }

    fn list_leads(&self) -> Result<Vec<Lead>, ServerError> {
        self.db.with_conn(|conn| leads::list_leads(conn))
    }

    fn update_lead(&self, id: &str, update: &LeadUpdate) -> Result<Lead, ServerError> {
        self.db.with_conn(|conn| {
            if !leads::update_lead(conn, id, update, Utc::now())? {
                return Err(ServerError::NotFound);
            }
            leads::get_lead(conn, id)?.ok_or(ServerError::NotFound)
        })
    }

    fn create_call_session(&self, new: &NewCallSession) -> Result<CallModeSession, ServerError> {
        let id = Uuid::new_v4().to_string();
        self.db.with_conn(|conn| {
            call_sessions::insert_session(conn, &id, new)?;
            call_sessions::get_session(conn, &id)?.ok_or(ServerError::InternalError)
        })
    }

    fn update_call_session(&self, id: &str, patch: &CallSessionPatch) -> Result<(), ServerError> {
        self.db.with_conn(|conn| {
            if call_sessions::update_session(conn, id, patch)? {
                Ok(())
            } else {
                Err(ServerError::NotFound)
            }
        })
    }

    fn list_call_sessions(&self) -> Result<Vec<CallModeSession>, ServerError> {
        self.db.with_conn(|conn| call_sessions::list_sessions(conn))
    }

    fn list_users(&self) -> Result<Vec<User>, ServerError> {
        self.db.with_conn(|conn| directory::list_users(conn))
    }

    fn list_teams(&self) -> Result<Vec<Team>, ServerError> {
        self.db.with_conn(|conn| directory::list_teams(conn))
    }

    fn list_developments(&self) -> Result<Vec<Development>, ServerError> {
        self.db.with_conn(|conn| directory::list_developments(conn))
    }

    fn list_sales(&self) -> Result<Vec<Sale>, ServerError> {
        self.db.with_conn(|conn| sales::list_sales(conn))
    }

    fn list_clients(&self) -> Result<Vec<Client>, ServerError> {
        self.db.with_conn(|conn| sales::list_clients(conn))
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, ServerError> {
        let email = normalize_email(email);
        let found = self
            .db
            .with_conn(|conn| directory::find_credentials(conn, &email))?;

        Ok(found.and_then(|(user, stored)| {
            (user.active && verify_password(&stored, password)).then_some(user)
        }))
    }
}
