use crate::db::{enum_column, json_list_column};
use crate::domain::{Lead, LeadSource, LeadUpdate};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, phone, developments_interest, broker_id, \
    last_contact, source, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let source: Option<String> = row.get(6)?;
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        developments_interest: json_list_column(3, row.get(3)?)?,
        broker_id: row.get(4)?,
        last_contact: row.get(5)?,
        source: source.map(|s| enum_column(6, s, LeadSource::parse)).transpose()?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn list_leads(conn: &Connection) -> Result<Vec<Lead>, ServerError> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM leads ORDER BY created_at, id"))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn get_lead(conn: &Connection, id: &str) -> Result<Option<Lead>, ServerError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM leads WHERE id = ?"),
        params![id],
        from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("load lead failed: {e}")))
}

pub fn insert_lead(conn: &Connection, lead: &Lead) -> Result<(), ServerError> {
    let interest = serde_json::to_string(&lead.developments_interest)
        .map_err(|e| ServerError::DbError(format!("encode interests failed: {e}")))?;
    conn.execute(
        &format!("INSERT INTO leads ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
        params![
            lead.id,
            lead.name,
            lead.phone,
            interest,
            lead.broker_id,
            lead.last_contact,
            lead.source.map(LeadSource::as_str),
            lead.created_at,
            lead.updated_at,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert lead failed: {e}")))?;
    Ok(())
}

/// Applies the fields present in `update`. Returns false when the lead is unknown.
pub fn update_lead(
    conn: &Connection,
    id: &str,
    update: &LeadUpdate,
    now: DateTime<Utc>,
) -> Result<bool, ServerError> {
    let changed = conn
        .execute(
            r#"
            UPDATE leads SET
                name = COALESCE(?1, name),
                last_contact = COALESCE(?2, last_contact),
                updated_at = ?3
            WHERE id = ?4
            "#,
            params![update.name, update.last_contact, now, id],
        )
        .map_err(|e| ServerError::DbError(format!("update lead failed: {e}")))?;
    Ok(changed > 0)
}
