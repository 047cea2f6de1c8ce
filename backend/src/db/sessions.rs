use super::profiles;
use super::{timestamp, StoreError};
use common::model::profile::Profile;
use rusqlite::{params, Connection, OptionalExtension};

/// Creates a session for `profile_id` and returns its bearer token.
pub fn create(conn: &Connection, profile_id: &str) -> Result<String, StoreError> {
    let token = uuid::Uuid::new_v4().simple().to_string();
    conn.execute(
        "INSERT INTO sessions (token, profile_id, created_at) VALUES (?1, ?2, ?3)",
        params![&token, profile_id, timestamp()],
    )?;
    Ok(token)
}

pub fn find_profile(conn: &Connection, token: &str) -> Result<Option<Profile>, StoreError> {
    let profile_id: Option<String> = conn
        .query_row(
            "SELECT profile_id FROM sessions WHERE token = ?1",
            params![token],
            |row| row.get(0),
        )
        .optional()?;
    match profile_id {
        Some(id) => profiles::find(conn, &id),
        None => Ok(None),
    }
}

pub fn delete(conn: &Connection, token: &str) -> Result<(), StoreError> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Signs a user out everywhere, used after deactivation.
pub fn delete_for_profile(conn: &Connection, profile_id: &str) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM sessions WHERE profile_id = ?1",
        params![profile_id],
    )?)
}

/// Like `delete_for_profile` but keeps `keep`, the session that made a
/// password change for its own account.
pub fn delete_others(conn: &Connection, profile_id: &str, keep: &str) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM sessions WHERE profile_id = ?1 AND token <> ?2",
        params![profile_id, keep],
    )?)
}
