use super::{json_column, parse_column, timestamp, StoreError};
use common::model::audit::{AuditSubmission, SubmissionPayload, SubmissionStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, document_id, employee_id, payload, status, comments, auditor_id, \
                       submitted_at, reviewed_at";

fn from_row(row: &Row) -> rusqlite::Result<AuditSubmission> {
    Ok(AuditSubmission {
        id: row.get(0)?,
        document_id: row.get(1)?,
        employee_id: row.get(2)?,
        payload: json_column(3, row.get(3)?)?,
        status: parse_column(4, row.get(4)?)?,
        comments: row.get(5)?,
        auditor_id: row.get(6)?,
        submitted_at: row.get(7)?,
        reviewed_at: row.get(8)?,
    })
}

pub fn insert(
    conn: &Connection,
    document_id: &str,
    employee_id: &str,
    payload: &SubmissionPayload,
) -> Result<AuditSubmission, StoreError> {
    let submission = AuditSubmission {
        id: uuid::Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        employee_id: employee_id.to_string(),
        payload: payload.clone(),
        status: SubmissionStatus::Pending,
        comments: None,
        auditor_id: None,
        submitted_at: timestamp(),
        reviewed_at: None,
    };
    conn.execute(
        "INSERT INTO audit_submissions (id, document_id, employee_id, payload, status, submitted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &submission.id,
            &submission.document_id,
            &submission.employee_id,
            serde_json::to_string(&submission.payload)?,
            submission.status.as_str(),
            &submission.submitted_at
        ],
    )?;
    Ok(submission)
}

pub fn find(conn: &Connection, id: &str) -> Result<Option<AuditSubmission>, StoreError> {
    let submission = conn
        .query_row(
            &format!("SELECT {} FROM audit_submissions WHERE id = ?1", COLUMNS),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(submission)
}

/// Oldest first so the queue is worked in arrival order.
pub fn list(
    conn: &Connection,
    status: Option<SubmissionStatus>,
    employee_id: Option<&str>,
) -> Result<Vec<AuditSubmission>, StoreError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(status) = status {
        clauses.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(employee_id) = employee_id {
        clauses.push("employee_id = ?");
        values.push(Value::Text(employee_id.to_string()));
    }

    let mut sql = format!("SELECT {} FROM audit_submissions", COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY submitted_at ASC");

    let mut stmt = conn.prepare(&sql)?;
    let submissions = stmt
        .query_map(params_from_iter(values), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(submissions)
}

/// Records the auditor's verdict on a still pending submission. Returns
/// `false` when the submission is missing or was already reviewed.
pub fn review(
    conn: &Connection,
    id: &str,
    auditor_id: &str,
    status: SubmissionStatus,
    comments: Option<&str>,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE audit_submissions
         SET status = ?1, comments = ?2, auditor_id = ?3, reviewed_at = ?4
         WHERE id = ?5 AND status = 'PENDING'",
        params![status.as_str(), comments, auditor_id, timestamp(), id],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::documents::fixtures::{document, profile};
    use crate::db::test_support::temp_database;
    use common::model::audit::DocumentDecision;
    use common::model::page_code::PageCodeEntry;
    use common::model::role::Role;

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            pages: vec![PageCodeEntry {
                page_number: 1,
                icd10_codes: vec!["I10".to_string()],
                cpt_codes: vec!["99213".to_string()],
                notes: "stable".to_string(),
            }],
            decision: DocumentDecision::Accept,
            decision_reason: None,
        }
    }

    #[test]
    fn payload_blob_survives_storage() {
        let (_dir, _path, conn) = temp_database();
        let provider = profile(&conn, "prov@clinic.test", Role::Provider);
        let coder = profile(&conn, "coder@clinic.test", Role::Employee);
        let doc = document(&conn, &provider.id);

        let created = insert(&conn, &doc.id, &coder.id, &payload()).unwrap();
        let stored = find(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored, created);
        assert_eq!(stored.status, SubmissionStatus::Pending);
    }

    #[test]
    fn review_only_once() {
        let (_dir, _path, conn) = temp_database();
        let provider = profile(&conn, "prov@clinic.test", Role::Provider);
        let coder = profile(&conn, "coder@clinic.test", Role::Employee);
        let auditor = profile(&conn, "aud@clinic.test", Role::Auditor);
        let doc = document(&conn, &provider.id);
        let created = insert(&conn, &doc.id, &coder.id, &payload()).unwrap();

        assert!(review(&conn, &created.id, &auditor.id, SubmissionStatus::Rejected, Some("E11.9 missing")).unwrap());
        assert!(!review(&conn, &created.id, &auditor.id, SubmissionStatus::Approved, None).unwrap());

        let stored = find(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Rejected);
        assert_eq!(stored.comments.as_deref(), Some("E11.9 missing"));
        assert_eq!(stored.auditor_id.as_deref(), Some(auditor.id.as_str()));
        assert!(stored.reviewed_at.is_some());

        assert!(list(&conn, Some(SubmissionStatus::Pending), None).unwrap().is_empty());
        assert_eq!(list(&conn, None, Some(&coder.id)).unwrap().len(), 1);
    }
}
