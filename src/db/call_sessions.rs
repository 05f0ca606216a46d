use crate::db::json_list_column;
use crate::domain::{CallCounters, CallModeSession, CallSessionPatch, NewCallSession};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, user_id, development_id, start_time, end_time, business_viewed, \
                       answered_calls, talked_calls, scheduled_calls, whatsapp_calls, \
                       not_interest_calls, recall_calls, voicemail_calls, invalid_number_calls, \
                       not_receiving_calls";

fn from_row(row: &Row<'_>) -> rusqlite::Result<CallModeSession> {
    Ok(CallModeSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        development_id: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        business_viewed: json_list_column(5, row.get(5)?)?,
        counters: CallCounters {
            answered_calls: row.get(6)?,
            talked_calls: row.get(7)?,
            scheduled_calls: row.get(8)?,
            whatsapp_calls: row.get(9)?,
            not_interest_calls: row.get(10)?,
            recall_calls: row.get(11)?,
            voicemail_calls: row.get(12)?,
            invalid_number_calls: row.get(13)?,
            not_receiving_calls: row.get(14)?,
        },
    })
}

fn encode_viewed(viewed: &[String]) -> Result<String, ServerError> {
    serde_json::to_string(viewed)
        .map_err(|e| ServerError::DbError(format!("encode business_viewed failed: {e}")))
}

pub fn insert_session(
    conn: &Connection,
    id: &str,
    new: &NewCallSession,
) -> Result<(), ServerError> {
    let c = &new.counters;
    conn.execute(
        &format!(
            "INSERT INTO call_mode_sessions ({COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            id,
            new.user_id,
            new.development_id,
            new.start_time,
            new.end_time,
            encode_viewed(&new.business_viewed)?,
            c.answered_calls,
            c.talked_calls,
            c.scheduled_calls,
            c.whatsapp_calls,
            c.not_interest_calls,
            c.recall_calls,
            c.voicemail_calls,
            c.invalid_number_calls,
            c.not_receiving_calls,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert call session failed: {e}")))?;
    Ok(())
}

/// Overwrites progress; `end_time` is only written when the patch carries one.
pub fn update_session(
    conn: &Connection,
    id: &str,
    patch: &CallSessionPatch,
) -> Result<bool, ServerError> {
    let c = &patch.counters;
    let changed = conn
        .execute(
            r#"
            UPDATE call_mode_sessions SET
                end_time = COALESCE(?1, end_time),
                business_viewed = ?2,
                answered_calls = ?3, talked_calls = ?4, scheduled_calls = ?5,
                whatsapp_calls = ?6, not_interest_calls = ?7, recall_calls = ?8,
                voicemail_calls = ?9, invalid_number_calls = ?10, not_receiving_calls = ?11
            WHERE id = ?12
            "#,
            params![
                patch.end_time,
                encode_viewed(&patch.business_viewed)?,
                c.answered_calls,
                c.talked_calls,
                c.scheduled_calls,
                c.whatsapp_calls,
                c.not_interest_calls,
                c.recall_calls,
                c.voicemail_calls,
                c.invalid_number_calls,
                c.not_receiving_calls,
                id,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("update call session failed: {e}")))?;
    Ok(changed > 0)
}

pub fn get_session(conn: &Connection, id: &str) -> Result<Option<CallModeSession>, ServerError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM call_mode_sessions WHERE id = ?"),
        params![id],
        from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("load call session failed: {e}")))
}

/// Sessions oldest first. Rows that fail to decode are skipped and logged.
pub fn list_sessions(conn: &Connection) -> Result<Vec<CallModeSession>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM call_mode_sessions ORDER BY start_time, id"
        ))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        match r {
            Ok(session) => out.push(session),
            Err(e) => log::warn!("Skipping malformed call session row: {e}"),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::business::fixtures::ts;
    use crate::tests::utils::init_test_db;

    #[test]
    fn progress_then_finalize() {
        let (_dir, db) = init_test_db();
        db.with_conn(|conn| {
            let opening = NewCallSession::opening("u1", Some("d1".into()), ts(1, 9));
            insert_session(conn, "s1", &opening)?;

            let progress = CallSessionPatch {
                end_time: None,
                business_viewed: vec!["b1".into()],
                counters: CallCounters {
                    answered_calls: 1,
                    ..Default::default()
                },
            };
            assert!(update_session(conn, "s1", &progress)?);
            let mid = get_session(conn, "s1")?.expect("session exists");
            assert_eq!(mid.end_time, None);
            assert_eq!(mid.counters.answered_calls, 1);

            let last = CallSessionPatch {
                end_time: Some(ts(1, 10)),
                business_viewed: vec!["b1".into(), "b2".into()],
                counters: CallCounters {
                    answered_calls: 1,
                    voicemail_calls: 1,
                    ..Default::default()
                },
            };
            update_session(conn, "s1", &last)?;
            let done = get_session(conn, "s1")?.expect("session exists");
            assert_eq!(done.end_time, Some(ts(1, 10)));
            assert_eq!(done.business_viewed, vec!["b1".to_string(), "b2".to_string()]);
            assert_eq!(done.counters.voicemail_calls, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn list_skips_rows_with_broken_viewed_list() {
        let (_dir, db) = init_test_db();
        let sessions = db
            .with_conn(|conn| {
                insert_session(conn, "good", &NewCallSession::opening("u1", None, ts(1, 9)))?;
                conn.execute(
                    "INSERT INTO call_mode_sessions (id, user_id, start_time, business_viewed) \
                     VALUES ('bad', 'u1', ?1, 'not json')",
                    params![ts(1, 10)],
                )?;
                list_sessions(conn)
            })
            .unwrap();
        let ids: Vec<_> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["good"]);
    }
}
