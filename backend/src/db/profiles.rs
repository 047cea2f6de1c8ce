use super::{map_unique, parse_column, timestamp, StoreError};
use common::model::profile::Profile;
use common::model::role::Role;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, email, role, active, created_at";

fn from_row(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: parse_column(3, row.get(3)?)?,
        active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn insert(
    conn: &Connection,
    name: &str,
    email: &str,
    role: Role,
    password_hash: &str,
) -> Result<Profile, StoreError> {
    let profile = Profile {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        email: email.trim().to_lowercase(),
        role,
        active: true,
        created_at: timestamp(),
    };
    conn.execute(
        "INSERT INTO profiles (id, name, email, role, active, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
        params![
            &profile.id,
            &profile.name,
            &profile.email,
            profile.role.as_str(),
            password_hash,
            &profile.created_at
        ],
    )
    .map_err(|e| map_unique(e, format!("a user with email {}", profile.email)))?;
    Ok(profile)
}

pub fn find(conn: &Connection, id: &str) -> Result<Option<Profile>, StoreError> {
    let profile = conn
        .query_row(
            &format!("SELECT {} FROM profiles WHERE id = ?1", COLUMNS),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(profile)
}

/// Profile plus stored password hash, for sign-in only.
pub fn find_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(Profile, String)>, StoreError> {
    let found = conn
        .query_row(
            &format!(
                "SELECT {}, password_hash FROM profiles WHERE email = ?1",
                COLUMNS
            ),
            params![email.trim()],
            |row| Ok((from_row(row)?, row.get::<_, String>(6)?)),
        )
        .optional()?;
    Ok(found)
}

pub fn list(conn: &Connection) -> Result<Vec<Profile>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM profiles ORDER BY role, name",
        COLUMNS
    ))?;
    let profiles = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(profiles)
}

pub fn count(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?)
}

/// Returns `false` when no such profile exists.
pub fn set_active(conn: &Connection, id: &str, active: bool) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE profiles SET active = ?1 WHERE id = ?2",
        params![active, id],
    )?;
    Ok(changed > 0)
}

pub fn set_password_hash(conn: &Connection, id: &str, hash: &str) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE profiles SET password_hash = ?1 WHERE id = ?2",
        params![hash, id],
    )?;
    Ok(changed > 0)
}
