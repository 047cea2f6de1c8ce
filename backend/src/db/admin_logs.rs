use super::{timestamp, StoreError};
use common::model::admin_log::AdminLog;
use rusqlite::{params, Connection};

pub fn insert(
    conn: &Connection,
    actor_id: Option<&str>,
    action: &str,
    details: &str,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO admin_logs (actor_id, action, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![actor_id, action, details, timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent first.
pub fn recent(conn: &Connection, limit: u32) -> Result<Vec<AdminLog>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, actor_id, action, details, created_at FROM admin_logs
         ORDER BY id DESC LIMIT ?1",
    )?;
    let logs = stmt
        .query_map(params![limit], |row| {
            Ok(AdminLog {
                id: row.get(0)?,
                actor_id: row.get(1)?,
                action: row.get(2)?,
                details: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}
