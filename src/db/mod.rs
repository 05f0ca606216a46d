pub mod businesses;
pub mod call_sessions;
pub mod connection;
pub mod directory;
pub mod leads;
pub mod sales;
pub mod store;

pub use connection::{init_db, Database};
pub use store::SqliteCrm;

use rusqlite::types::Type;

/// Reads a text column holding one of our enum spellings.
pub(crate) fn enum_column<T>(
    idx: usize,
    raw: String,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(&raw).ok_or_else(|| {
        let msg = format!("unknown value '{raw}'");
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
    })
}

/// Reads a text column holding a JSON array of ids.
pub(crate) fn json_list_column(idx: usize, raw: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
