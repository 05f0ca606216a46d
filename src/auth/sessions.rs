// src/auth/sessions.rs
use crate::auth::token::{generate_token_default, hash_token};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Opens a browser session for `user_id` and returns the raw cookie token.
pub fn create_session(conn: &Connection, user_id: &str, now: i64) -> Result<String, ServerError> {
    let raw_token = generate_token_default();
    let hash = hash_token(&raw_token);

    conn.execute(
        r#"
        insert into web_sessions (user_id, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![user_id, hash.as_slice(), now, now + SESSION_TTL_SECS],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(raw_token)
}

/// User id behind a live (unexpired, unrevoked) session token.
pub fn load_user_id_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<String>, ServerError> {
    let hash = hash_token(raw_token);

    conn.query_row(
        r#"
        select user_id
        from web_sessions
        where token_hash = ?
          and expires_at > ?
          and revoked_at is null
        "#,
        params![hash.as_slice(), now],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    let hash = hash_token(raw_token);
    conn.execute(
        "update web_sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, hash.as_slice()],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;
    Ok(())
}
