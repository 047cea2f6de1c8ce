use super::{json_column, timestamp, StoreError};
use common::model::page_code::PageCode;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "document_id, page_number, icd10_codes, cpt_codes, notes, author_id, updated_at";

fn from_row(row: &Row) -> rusqlite::Result<PageCode> {
    Ok(PageCode {
        document_id: row.get(0)?,
        page_number: row.get(1)?,
        icd10_codes: json_column(2, row.get(2)?)?,
        cpt_codes: json_column(3, row.get(3)?)?,
        notes: row.get(4)?,
        author_id: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Inserts or replaces the row keyed by (document, page, author) and returns
/// what was stored.
pub fn upsert(
    conn: &Connection,
    document_id: &str,
    page_number: u32,
    author_id: &str,
    icd10_codes: &[String],
    cpt_codes: &[String],
    notes: &str,
) -> Result<PageCode, StoreError> {
    let code = PageCode {
        document_id: document_id.to_string(),
        page_number,
        icd10_codes: icd10_codes.to_vec(),
        cpt_codes: cpt_codes.to_vec(),
        notes: notes.to_string(),
        author_id: author_id.to_string(),
        updated_at: timestamp(),
    };
    conn.execute(
        &format!(
            "INSERT INTO page_codes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(document_id, page_number, author_id) DO UPDATE SET
                icd10_codes = excluded.icd10_codes,
                cpt_codes = excluded.cpt_codes,
                notes = excluded.notes,
                updated_at = excluded.updated_at",
            COLUMNS
        ),
        params![
            &code.document_id,
            code.page_number,
            serde_json::to_string(&code.icd10_codes)?,
            serde_json::to_string(&code.cpt_codes)?,
            &code.notes,
            &code.author_id,
            &code.updated_at
        ],
    )?;
    Ok(code)
}

pub fn find(
    conn: &Connection,
    document_id: &str,
    page_number: u32,
    author_id: &str,
) -> Result<Option<PageCode>, StoreError> {
    let code = conn
        .query_row(
            &format!(
                "SELECT {} FROM page_codes
                 WHERE document_id = ?1 AND page_number = ?2 AND author_id = ?3",
                COLUMNS
            ),
            params![document_id, page_number, author_id],
            from_row,
        )
        .optional()?;
    Ok(code)
}

/// Every author's rows for a document, by page.
pub fn list_for_document(conn: &Connection, document_id: &str) -> Result<Vec<PageCode>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM page_codes WHERE document_id = ?1 ORDER BY page_number, author_id",
        COLUMNS
    ))?;
    let codes = stmt
        .query_map(params![document_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::documents::fixtures::{document, profile};
    use crate::db::test_support::temp_database;
    use common::model::role::Role;

    #[test]
    fn upsert_then_fetch_returns_the_same_lists() {
        let (_dir, _path, conn) = temp_database();
        let provider = profile(&conn, "prov@clinic.test", Role::Provider);
        let coder = profile(&conn, "coder@clinic.test", Role::Employee);
        let doc = document(&conn, &provider.id);

        let icd = vec!["I10".to_string(), "E11.9".to_string()];
        let cpt = vec!["99213".to_string()];
        upsert(&conn, &doc.id, 2, &coder.id, &icd, &cpt, "follow-up").unwrap();
        upsert(&conn, &doc.id, 2, &coder.id, &icd, &cpt, "follow-up").unwrap();

        let stored = find(&conn, &doc.id, 2, &coder.id).unwrap().unwrap();
        assert_eq!(stored.icd10_codes, icd);
        assert_eq!(stored.cpt_codes, cpt);
        assert_eq!(stored.notes, "follow-up");
        assert_eq!(list_for_document(&conn, &doc.id).unwrap().len(), 1);
    }

    #[test]
    fn second_save_replaces_lists() {
        let (_dir, _path, conn) = temp_database();
        let provider = profile(&conn, "prov@clinic.test", Role::Provider);
        let coder = profile(&conn, "coder@clinic.test", Role::Employee);
        let doc = document(&conn, &provider.id);

        upsert(&conn, &doc.id, 1, &coder.id, &["I10".to_string()], &[], "").unwrap();
        upsert(&conn, &doc.id, 1, &coder.id, &[], &["J0585".to_string()], "inj").unwrap();

        let stored = find(&conn, &doc.id, 1, &coder.id).unwrap().unwrap();
        assert!(stored.icd10_codes.is_empty());
        assert_eq!(stored.cpt_codes, vec!["J0585".to_string()]);
    }

    #[test]
    fn rows_are_per_author() {
        let (_dir, _path, conn) = temp_database();
        let provider = profile(&conn, "prov@clinic.test", Role::Provider);
        let first = profile(&conn, "a@clinic.test", Role::Employee);
        let second = profile(&conn, "b@clinic.test", Role::Employee);
        let doc = document(&conn, &provider.id);

        upsert(&conn, &doc.id, 1, &first.id, &["I10".to_string()], &[], "").unwrap();
        upsert(&conn, &doc.id, 1, &second.id, &["R51.9".to_string()], &[], "").unwrap();

        assert_eq!(list_for_document(&conn, &doc.id).unwrap().len(), 2);
        assert!(find(&conn, &doc.id, 3, &first.id).unwrap().is_none());
    }
}
