// src/state.rs

//! Everything a request handler needs, built once in `main` and passed by
//! reference to the router.

use crate::api::events::{BusinessBook, PushEvent};
use crate::api::CrmApi;
use crate::callmode::CallWalk;
use crate::config::Config;
use crate::db::Database;
use crate::domain::{Business, Lead};
use crate::errors::ServerError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

pub struct AppState {
    pub config: Config,
    /// Web tier database (browser sessions; CRM data too on the SQLite backend).
    pub db: Database,
    pub api: Box<dyn CrmApi>,
    walks: Mutex<HashMap<String, Arc<Mutex<CallWalk>>>>,
    book: RwLock<Option<Arc<BusinessBook>>>,
}

impl AppState {
    pub fn new(config: Config, db: Database, api: Box<dyn CrmApi>) -> Self {
        Self {
            config,
            db,
            api,
            walks: Mutex::new(HashMap::new()),
            book: RwLock::new(None),
        }
    }

    /// Current business/lead snapshot, fetched from the API on first use.
    pub fn book(&self) -> Result<Arc<BusinessBook>, ServerError> {
        if let Some(book) = self
            .book
            .read()
            .map_err(|_| ServerError::InternalError)?
            .as_ref()
        {
            return Ok(Arc::clone(book));
        }
        self.refresh_book()
    }

    /// Drops the cached snapshot and loads a fresh one.
    pub fn refresh_book(&self) -> Result<Arc<BusinessBook>, ServerError> {
        let fresh = Arc::new(BusinessBook::new(
            self.api.list_businesses()?,
            self.api.list_leads()?,
        ));
        *self.book.write().map_err(|_| ServerError::InternalError)? = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    fn swap_book<F>(&self, f: F) -> Result<(), ServerError>
    where
        F: FnOnce(&BusinessBook) -> BusinessBook,
    {
        let mut slot = self.book.write().map_err(|_| ServerError::InternalError)?;
        if let Some(current) = slot.as_ref() {
            *slot = Some(Arc::new(f(current)));
        }
        Ok(())
    }

    /// Folds a push event into the cached snapshot, if one is loaded.
    pub fn apply_event(&self, event: &PushEvent) -> Result<(), ServerError> {
        self.swap_book(|book| book.apply(event))
    }

    pub fn remember_business(&self, business: &Business) -> Result<(), ServerError> {
        self.swap_book(|book| book.with_business(business))
    }

    pub fn remember_lead(&self, lead: &Lead) -> Result<(), ServerError> {
        self.swap_book(|book| book.with_lead(lead))
    }

    pub fn forget_business(&self, id: &str) -> Result<(), ServerError> {
        self.swap_book(|book| book.without_business(id))
    }

    /// Registers a new walk. Walks the same user left open are closed first,
    /// so each user has at most one.
    pub fn insert_walk(&self, walk: CallWalk, now: DateTime<Utc>) -> Result<String, ServerError> {
        let replaced = self.take_walks(|w| w.user_id() == walk.user_id())?;
        self.close_walks(replaced, now, "replaced by a new walk");

        let id = walk.session_id().to_string();
        self.walks
            .lock()
            .map_err(|_| ServerError::InternalError)?
            .insert(id.clone(), Arc::new(Mutex::new(walk)));
        Ok(id)
    }

    /// Closes walks untouched for longer than the configured idle time.
    pub fn close_idle_walks(&self, now: DateTime<Utc>) -> Result<usize, ServerError> {
        let max_idle = Duration::minutes(self.config.walk_idle_minutes);
        let idle = self.take_walks(|w| now - w.last_activity() >= max_idle)?;
        let count = idle.len();
        self.close_walks(idle, now, "idle");
        Ok(count)
    }

    /// Removes the walks matching `pred`. Walks busy with a request are left
    /// alone.
    fn take_walks<P>(&self, pred: P) -> Result<Vec<Arc<Mutex<CallWalk>>>, ServerError>
    where
        P: Fn(&CallWalk) -> bool,
    {
        let mut walks = self.walks.lock().map_err(|_| ServerError::InternalError)?;
        let ids: Vec<String> = walks
            .iter()
            .filter(|(_, walk)| walk.try_lock().map_or(false, |w| pred(&w)))
            .map(|(id, _)| id.clone())
            .collect();
        Ok(ids.iter().filter_map(|id| walks.remove(id)).collect())
    }

    fn close_walks(&self, walks: Vec<Arc<Mutex<CallWalk>>>, now: DateTime<Utc>, reason: &str) {
        for walk in walks {
            let Ok(mut walk) = walk.lock() else {
                log::warn!("Dropped a poisoned call-mode walk");
                continue;
            };
            match walk.close(self.api.as_ref(), now) {
                Ok(()) => log::info!("Closed call-mode session {} ({reason})", walk.session_id()),
                Err(e) => log::warn!(
                    "Call-mode session {} ({reason}) could not be closed: {e}",
                    walk.session_id()
                ),
            }
        }
    }

    /// The walk with this session id, if it belongs to `user_id`.
    pub fn walk_for(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Arc<Mutex<CallWalk>>, ServerError> {
        let walk = self
            .walks
            .lock()
            .map_err(|_| ServerError::InternalError)?
            .get(session_id)
            .cloned()
            .ok_or(ServerError::NotFound)?;

        let owner = walk
            .lock()
            .map_err(|_| ServerError::InternalError)?
            .user_id()
            .to_string();
        if owner != user_id {
            return Err(ServerError::Forbidden("not your call-mode session".into()));
        }
        Ok(walk)
    }

    pub fn remove_walk(&self, session_id: &str) -> Result<(), ServerError> {
        self.walks
            .lock()
            .map_err(|_| ServerError::InternalError)?
            .remove(session_id);
        Ok(())
    }
}
