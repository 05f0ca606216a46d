use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use crate::errors::ServerError;

/// Schema bundled into the binary, used by tests and `init_embedded`.
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slots, one per database path.
thread_local! {
    static DB_CONNS: RefCell<HashMap<String, Connection>> = RefCell::new(HashMap::new());
}

#[derive(Clone, Debug)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides this thread's connection to the closure, opening it on first use.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        DB_CONNS
            .try_with(|cell| {
                let mut conns = cell.borrow_mut();
                if !conns.contains_key(&self.path) {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| ServerError::DbError(format!("Open DB failed: {e}")))?;
                    conn.busy_timeout(std::time::Duration::from_secs(5))
                        .map_err(|e| ServerError::DbError(format!("busy_timeout failed: {e}")))?;
                    conns.insert(self.path.clone(), conn);
                }
                let conn = conns.get_mut(&self.path).ok_or(ServerError::InternalError)?;
                f(conn)
            })
            .map_err(|_| ServerError::InternalError)?
    }

    /// Applies the bundled schema.
    pub fn init_embedded(&self) -> Result<(), ServerError> {
        self.with_conn(|conn| {
            conn.execute_batch(SCHEMA_SQL)
                .map_err(|e| ServerError::DbError(format!("Failed to apply schema: {e}")))
        })
    }
}

/// Initialize database from a SQL schema file
pub fn init_db(db: &Database, schema_path: &str) -> Result<(), ServerError> {
    let schema_sql = fs::read_to_string(schema_path)
        .map_err(|e| ServerError::DbError(format!("Failed to read schema file: {e}")))?;

    db.with_conn(|conn| {
        conn.execute_batch(&schema_sql)
            .map_err(|e| ServerError::DbError(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    log::info!("Database {} initialized from {}", db.path(), schema_path);
    Ok(())
}
