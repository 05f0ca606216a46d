// src/db/directory.rs
use crate::db::enum_column;
use crate::domain::{Development, Role, Team, User};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: enum_column(3, row.get(3)?, Role::parse)?,
        active: row.get(4)?,
        team_id: row.get(5)?,
    })
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, role, active, team_id FROM users ORDER BY name")
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map([], user_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

/// User plus stored credentials, looked up by normalized email.
pub fn find_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(User, String)>, ServerError> {
    conn.query_row(
        r#"
        SELECT id, name, email, role, active, team_id, password_hash
        FROM users
        WHERE email = ? AND password_hash IS NOT NULL
        "#,
        params![email],
        |row| Ok((user_from_row(row)?, row.get(6)?)),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("credential lookup failed: {e}")))
}

pub fn insert_user(
    conn: &Connection,
    user: &User,
    password_hash: Option<&str>,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        INSERT INTO users (id, name, email, role, active, team_id, password_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            user.id,
            user.name,
            user.email,
            user.role.as_str(),
            user.active,
            user.team_id,
            password_hash,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;
    Ok(())
}

pub fn list_teams(conn: &Connection) -> Result<Vec<Team>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT id, name, leader_id FROM teams ORDER BY name")
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                leader_id: row.get(2)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn insert_team(conn: &Connection, team: &Team) -> Result<(), ServerError> {
    conn.execute(
        "INSERT INTO teams (id, name, leader_id) VALUES (?, ?, ?)",
        params![team.id, team.name, team.leader_id],
    )
    .map_err(|e| ServerError::DbError(format!("insert team failed: {e}")))?;
    Ok(())
}

pub fn list_developments(conn: &Connection) -> Result<Vec<Development>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT id, name, location, description FROM developments ORDER BY name")
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Development {
                id: row.get(0)?,
                name: row.get(1)?,
                location: row.get(2)?,
                description: row.get(3)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn insert_development(conn: &Connection, dev: &Development) -> Result<(), ServerError> {
    conn.execute(
        "INSERT INTO developments (id, name, location, description) VALUES (?, ?, ?, ?)",
        params![dev.id, dev.name, dev.location, dev.description],
    )
    .map_err(|e| ServerError::DbError(format!("insert development failed: {e}")))?;
    Ok(())
}
