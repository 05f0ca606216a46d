use crate::db::enum_column;
use crate::domain::{Business, BusinessStatus, LeadSource, NewBusiness, StatusUpdate};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, lead_id, development_id, broker_id, source, status, scheduled_at, \
                       recall_at, notes, last_call_at, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Business> {
    Ok(Business {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        development_id: row.get(2)?,
        broker_id: row.get(3)?,
        source: enum_column(4, row.get(4)?, LeadSource::parse)?,
        status: enum_column(5, row.get(5)?, BusinessStatus::parse)?,
        scheduled_at: row.get(6)?,
        recall_at: row.get(7)?,
        notes: row.get(8)?,
        last_call_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// All businesses, newest first.
pub fn list_businesses(conn: &Connection) -> Result<Vec<Business>, ServerError> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM businesses ORDER BY created_at DESC, id"))
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

pub fn get_business(conn: &Connection, id: &str) -> Result<Option<Business>, ServerError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM businesses WHERE id = ?"),
        params![id],
        from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("load business failed: {e}")))
}

pub fn insert_business(
    conn: &Connection,
    id: &str,
    new: &NewBusiness,
    now: DateTime<Utc>,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        INSERT INTO businesses
            (id, lead_id, development_id, broker_id, source, status, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
        params![
            id,
            new.lead_id,
            new.development_id,
            new.broker_id,
            new.source.as_str(),
            new.status.as_str(),
            new.notes,
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert business failed: {e}")))?;
    Ok(())
}

/// Writes status, both dates, notes and last call time. Returns false when the
/// business does not exist.
pub fn update_status(
    conn: &Connection,
    id: &str,
    update: &StatusUpdate,
    now: DateTime<Utc>,
) -> Result<bool, ServerError> {
    let changed = conn
        .execute(
            r#"
            UPDATE businesses SET
                status = ?1, scheduled_at = ?2, recall_at = ?3, notes = ?4,
                last_call_at = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
            params![
                update.status.as_str(),
                update.scheduled_at,
                update.recall_at,
                update.notes,
                update.last_call_at,
                now,
                id,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("update business failed: {e}")))?;
    Ok(changed > 0)
}

pub fn delete_business(conn: &Connection, id: &str) -> Result<bool, ServerError> {
    let changed = conn
        .execute("DELETE FROM businesses WHERE id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete business failed: {e}")))?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::business::fixtures::ts;
    use crate::domain::datetime::parse_local;
    use crate::tests::utils::init_test_db;

    fn new_business() -> NewBusiness {
        NewBusiness {
            lead_id: "l1".into(),
            development_id: "d1".into(),
            broker_id: "u1".into(),
            source: LeadSource::Website,
            status: BusinessStatus::New,
            notes: None,
        }
    }

    #[test]
    fn insert_then_update_status() {
        let (_dir, db) = init_test_db();
        db.with_conn(|conn| {
            insert_business(conn, "b1", &new_business(), ts(1, 9))?;

            let update = StatusUpdate {
                status: BusinessStatus::Recall,
                scheduled_at: None,
                recall_at: parse_local("2024-06-01T09:00"),
                notes: Some("call after lunch".into()),
                last_call_at: Some(ts(2, 10)),
            };
            assert!(update_status(conn, "b1", &update, ts(2, 10))?);

            let b = get_business(conn, "b1")?.expect("business exists");
            assert_eq!(b.status, BusinessStatus::Recall);
            assert_eq!(b.recall_at, parse_local("2024-06-01T09:00"));
            assert_eq!(b.last_call_at, Some(ts(2, 10)));
            assert_eq!(b.source, LeadSource::Website);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn update_of_missing_business_reports_false() {
        let (_dir, db) = init_test_db();
        let update = StatusUpdate {
            status: BusinessStatus::Lost,
            scheduled_at: None,
            recall_at: None,
            notes: None,
            last_call_at: None,
        };
        let found = db
            .with_conn(|conn| update_status(conn, "nope", &update, ts(1, 9)))
            .unwrap();
        assert!(!found);
    }
}
