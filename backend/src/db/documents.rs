use super::{parse_column, StoreError};
use common::model::document::{Document, DocumentStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, provider_id, filename, storage_path, page_count, byte_size, status, \
                       assigned_to, checksum, uploaded_at";

fn from_row(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        provider_id: row.get(1)?,
        filename: row.get(2)?,
        storage_path: row.get(3)?,
        page_count: row.get(4)?,
        byte_size: row.get::<_, i64>(5)? as u64,
        status: parse_column(6, row.get(6)?)?,
        assigned_to: row.get(7)?,
        checksum: row.get(8)?,
        uploaded_at: row.get(9)?,
    })
}

/// Narrows `list`. Empty filter means every document.
#[derive(Debug, Default, Clone)]
pub struct DocumentFilter {
    pub provider_id: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<DocumentStatus>,
}

pub fn insert(conn: &Connection, doc: &Document) -> Result<(), StoreError> {
    conn.execute(
        &format!(
            "INSERT INTO documents ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            COLUMNS
        ),
        params![
            &doc.id,
            &doc.provider_id,
            &doc.filename,
            &doc.storage_path,
            doc.page_count,
            doc.byte_size as i64,
            doc.status.as_str(),
            &doc.assigned_to,
            &doc.checksum,
            &doc.uploaded_at
        ],
    )?;
    Ok(())
}

pub fn find(conn: &Connection, id: &str) -> Result<Option<Document>, StoreError> {
    let doc = conn
        .query_row(
            &format!("SELECT {} FROM documents WHERE id = ?1", COLUMNS),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(doc)
}

/// Newest uploads first.
pub fn list(conn: &Connection, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(provider_id) = &filter.provider_id {
        clauses.push("provider_id = ?");
        values.push(Value::Text(provider_id.clone()));
    }
    if let Some(assigned_to) = &filter.assigned_to {
        clauses.push("assigned_to = ?");
        values.push(Value::Text(assigned_to.clone()));
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    let mut sql = format!("SELECT {} FROM documents", COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY uploaded_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let docs = stmt
        .query_map(params_from_iter(values), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(docs)
}

/// Writes `status` unconditionally. Returns `false` for an unknown id.
pub fn set_status(conn: &Connection, id: &str, status: DocumentStatus) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE documents SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(changed > 0)
}

/// Hands the document to `employee_id` and marks it `ASSIGNED`.
pub fn assign(conn: &Connection, id: &str, employee_id: &str) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE documents SET assigned_to = ?1, status = ?2 WHERE id = ?3",
        params![employee_id, DocumentStatus::Assigned.as_str(), id],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::db::{profiles, timestamp};
    use common::model::profile::Profile;
    use common::model::role::Role;

    pub fn profile(conn: &Connection, email: &str, role: Role) -> Profile {
        profiles::insert(conn, email, email, role, "unused").unwrap()
    }

    pub fn document(conn: &Connection, provider_id: &str) -> Document {
        let doc = Document {
            id: uuid::Uuid::new_v4().to_string(),
            provider_id: provider_id.to_string(),
            filename: "chart.pdf".to_string(),
            storage_path: format!("documents/{}/chart.pdf", provider_id),
            page_count: 3,
            byte_size: 1024,
            status: DocumentStatus::Uploaded,
            assigned_to: None,
            checksum: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            uploaded_at: timestamp(),
        };
        insert(conn, &doc).unwrap();
        doc
    }
}
