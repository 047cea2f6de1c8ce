use super::{parse_column, timestamp, StoreError};
use common::model::query::{DocumentQuery, QueryStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COLUMNS: &str = "q.id, q.document_id, q.page_number, q.raised_by, q.question, q.answer, \
                       q.answered_by, q.status, q.created_at, q.answered_at";

fn from_row(row: &Row) -> rusqlite::Result<DocumentQuery> {
    Ok(DocumentQuery {
        id: row.get(0)?,
        document_id: row.get(1)?,
        page_number: row.get(2)?,
        raised_by: row.get(3)?,
        question: row.get(4)?,
        answer: row.get(5)?,
        answered_by: row.get(6)?,
        status: parse_column(7, row.get(7)?)?,
        created_at: row.get(8)?,
        answered_at: row.get(9)?,
    })
}

pub fn insert(
    conn: &Connection,
    document_id: &str,
    page_number: Option<u32>,
    raised_by: &str,
    question: &str,
) -> Result<DocumentQuery, StoreError> {
    let query = DocumentQuery {
        id: uuid::Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        page_number,
        raised_by: raised_by.to_string(),
        question: question.trim().to_string(),
        answer: None,
        answered_by: None,
        status: QueryStatus::Open,
        created_at: timestamp(),
        answered_at: None,
    };
    conn.execute(
        "INSERT INTO document_queries (id, document_id, page_number, raised_by, question, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &query.id,
            &query.document_id,
            query.page_number,
            &query.raised_by,
            &query.question,
            query.status.as_str(),
            &query.created_at
        ],
    )?;
    Ok(query)
}

pub fn find(conn: &Connection, id: &str) -> Result<Option<DocumentQuery>, StoreError> {
    let query = conn
        .query_row(
            &format!("SELECT {} FROM document_queries q WHERE q.id = ?1", COLUMNS),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(query)
}

pub fn list_for_document(conn: &Connection, document_id: &str) -> Result<Vec<DocumentQuery>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM document_queries q WHERE q.document_id = ?1 ORDER BY q.created_at",
        COLUMNS
    ))?;
    let queries = stmt
        .query_map(params![document_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(queries)
}

/// Queries across documents, scoped the same way as the document list.
#[derive(Debug, Default, Clone)]
pub struct QueryFilter {
    pub provider_id: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<QueryStatus>,
}

pub fn list(conn: &Connection, filter: &QueryFilter) -> Result<Vec<DocumentQuery>, StoreError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(provider_id) = &filter.provider_id {
        clauses.push("d.provider_id = ?");
        values.push(Value::Text(provider_id.clone()));
    }
    if let Some(assigned_to) = &filter.assigned_to {
        clauses.push("d.assigned_to = ?");
        values.push(Value::Text(assigned_to.clone()));
    }
    if let Some(status) = filter.status {
        clauses.push("q.status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    let mut sql = format!(
        "SELECT {} FROM document_queries q JOIN documents d ON d.id = q.document_id",
        COLUMNS
    );
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY q.created_at");

    let mut stmt = conn.prepare(&sql)?;
    let queries = stmt
        .query_map(params_from_iter(values), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(queries)
}

/// Stores the answer and closes the query. Answering again overwrites.
pub fn answer(conn: &Connection, id: &str, answered_by: &str, answer: &str) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE document_queries
         SET answer = ?1, answered_by = ?2, status = 'ANSWERED', answered_at = ?3
         WHERE id = ?4",
        params![answer.trim(), answered_by, timestamp(), id],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::documents::fixtures::{document, profile};
    use crate::db::test_support::temp_database;
    use common::model::role::Role;

    #[test]
    fn raise_list_and_answer() {
        let (_dir, _path, conn) = temp_database();
        let provider = profile(&conn, "prov@clinic.test", Role::Provider);
        let coder = profile(&conn, "coder@clinic.test", Role::Employee);
        let doc = document(&conn, &provider.id);

        let query = insert(&conn, &doc.id, Some(2), &coder.id, " Which laterality? ").unwrap();
        assert_eq!(query.question, "Which laterality?");

        let open = QueryFilter {
            provider_id: Some(provider.id.clone()),
            status: Some(QueryStatus::Open),
            ..Default::default()
        };
        assert_eq!(list(&conn, &open).unwrap().len(), 1);

        assert!(answer(&conn, &query.id, &provider.id, "Left knee").unwrap());
        assert!(list(&conn, &open).unwrap().is_empty());

        let stored = find(&conn, &query.id).unwrap().unwrap();
        assert_eq!(stored.status, QueryStatus::Answered);
        assert_eq!(stored.answer.as_deref(), Some("Left knee"));
        assert_eq!(list_for_document(&conn, &doc.id).unwrap().len(), 1);
    }
}
