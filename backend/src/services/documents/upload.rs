//! # Document Upload
//!
//! `POST /api/documents/upload` accepts a multipart form with:
//!
//! - `file`: the PDF itself. The filename must end in `.pdf`.
//! - `page_count` (optional): page count as entered by the provider. When it
//!   is missing the count is estimated from the PDF's page objects.
//!
//! The bytes are streamed into the `documents` bucket while an MD5 digest is
//! computed, so the upload is never held in memory as a whole. Bodies above
//! the configured limit are refused and the partial object is removed.

use crate::activity::actions;
use crate::auth::AuthUser;
use crate::db::{documents, timestamp};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::storage::Storage;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::document::{Document, DocumentStatus};
use common::model::role::Role;
use futures_util::StreamExt;
use md5::Context;
use regex::bytes::Regex;
use std::io::{BufWriter, Write};
use std::sync::LazyLock;

/// A page object, `/Type /Page`, but not the `/Type /Pages` tree nodes.
static PAGE_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page(?:(?-u:[^s])|$)").expect("valid page object regex"));

/// What the `file` part left behind in storage.
struct StoredFile {
    filename: String,
    byte_size: u64,
    checksum: String,
}

pub async fn process(state: web::Data<AppState>, user: AuthUser, payload: Multipart) -> impl Responder {
    match upload_document(&state, &user, payload).await {
        Ok(doc) => HttpResponse::Created().json(doc),
        Err(e) => e.error_response(),
    }
}

pub async fn upload_document(
    state: &AppState,
    user: &AuthUser,
    payload: Multipart,
) -> Result<Document, ServiceError> {
    user.require(&[Role::Provider, Role::Admin])?;

    let id = uuid::Uuid::new_v4().to_string();
    let key = Storage::document_key(user.id(), &id);

    let (stored, page_count) = match receive(state, &key, payload).await {
        Ok(received) => received,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&key) {
                log::warn!("Could not remove partial upload {}: {}", key, cleanup);
            }
            return Err(e);
        }
    };

    let page_count = match page_count {
        Some(count) => count,
        None => estimate_page_count(&state.storage.read(&key)?),
    };

    let doc = Document {
        id,
        provider_id: user.id().to_string(),
        filename: stored.filename,
        storage_path: key,
        page_count,
        byte_size: stored.byte_size,
        status: DocumentStatus::Uploaded,
        assigned_to: None,
        checksum: stored.checksum,
        uploaded_at: timestamp(),
    };
    let conn = state.connect()?;
    documents::insert(&conn, &doc)?;

    log::info!(
        "Stored {} ({} bytes, {} pages) for {}",
        doc.filename,
        doc.byte_size,
        doc.page_count,
        user.profile.email
    );
    state.activity.record(
        Some(user.id()),
        actions::DOCUMENT_UPLOADED,
        format!("{} ({})", doc.filename, doc.id),
    );
    Ok(doc)
}

/// Reads every part of the form. Unknown parts are skipped.
async fn receive(
    state: &AppState,
    key: &str,
    mut payload: Multipart,
) -> Result<(StoredFile, Option<u32>), ServiceError> {
    let mut stored: Option<StoredFile> = None;
    let mut page_count: Option<u32> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ServiceError::bad_request(format!("Malformed upload: {}", e)))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("file") => {
                if stored.is_some() {
                    return Err(ServiceError::bad_request("Only one file may be uploaded at a time"));
                }
                stored = Some(store_file(state, key, &mut field).await?);
            }
            Some("page_count") => {
                let text = read_text(&mut field).await?;
                page_count = parse_page_count(&text)?;
            }
            _ => {}
        }
    }

    let stored = stored.ok_or_else(|| ServiceError::bad_request("Missing file"))?;
    Ok((stored, page_count))
}

async fn store_file(state: &AppState, key: &str, field: &mut Field) -> Result<StoredFile, ServiceError> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
        .unwrap_or_default();
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ServiceError::bad_request("The file must end with .pdf"));
    }

    let mut writer = BufWriter::new(state.storage.create(key)?);
    let mut hasher = Context::new();
    let mut byte_size: u64 = 0;

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ServiceError::bad_request(format!("Upload interrupted: {}", e)))?;
        byte_size += chunk.len() as u64;
        if byte_size > state.max_upload_bytes {
            return Err(ServiceError::bad_request(format!(
                "The file is larger than the {} MB limit",
                state.max_upload_bytes / (1024 * 1024)
            )));
        }
        hasher.consume(&chunk);
        writer.write_all(&chunk)?;
    }
    writer.flush()?;

    if byte_size == 0 {
        return Err(ServiceError::bad_request("The file is empty"));
    }
    Ok(StoredFile {
        filename,
        byte_size,
        checksum: format!("{:x}", hasher.finalize()),
    })
}

async fn read_text(field: &mut Field) -> Result<String, ServiceError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ServiceError::bad_request(format!("Malformed upload: {}", e)))?;
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| ServiceError::bad_request("Form fields must be UTF-8"))
}

/// Blank means "not given".
fn parse_page_count(text: &str) -> Result<Option<u32>, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<u32>() {
        Ok(count) if count >= 1 => Ok(Some(count)),
        _ => Err(ServiceError::bad_request(format!(
            "Page count must be a positive number, got '{}'",
            text
        ))),
    }
}

/// Counts page objects. Compressed object streams hide them, so the result
/// is a floor of one rather than an exact figure.
pub fn estimate_page_count(pdf: &[u8]) -> u32 {
    let pages = PAGE_OBJECT_RE.find_iter(pdf).count();
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;

    const BOUNDARY: &str = "medcode-test-boundary";

    fn form(filename: &str, content: &[u8], page_count: Option<&str>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(count) = page_count {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"page_count\"\r\n\r\n{}\r\n",
                    BOUNDARY, count
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(token: &str, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/documents/upload")
            .insert_header(bearer(token))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    const TWO_PAGES: &[u8] =
        b"%PDF-1.4\n1 0 obj << /Type /Pages /Count 2 >> endobj\n2 0 obj << /Type /Page >> endobj\n3 0 obj << /Type/Page>> endobj\n%%EOF";

    #[::core::prelude::v1::test]
    fn estimates_pages_without_counting_the_tree() {
        assert_eq!(estimate_page_count(TWO_PAGES), 2);
        assert_eq!(estimate_page_count(b"not a pdf"), 1);
    }

    #[::core::prelude::v1::test]
    fn page_count_field() {
        assert_eq!(parse_page_count(" 12 ").unwrap(), Some(12));
        assert_eq!(parse_page_count("").unwrap(), None);
        assert!(parse_page_count("0").is_err());
        assert!(parse_page_count("three").is_err());
    }

    #[actix_web::test]
    async fn provider_uploads_a_pdf() {
        let mut env = TestEnv::new();
        let (provider, token) = env.user("prov@clinic.test", Role::Provider);
        let app = test_app!(env.state);

        let resp = test::call_service(&app, upload_request(&token, form("chart.PDF", TWO_PAGES, None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let doc: Document = test::read_body_json(resp).await;
        assert_eq!(doc.provider_id, provider.id);
        assert_eq!(doc.filename, "chart.PDF");
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.byte_size, TWO_PAGES.len() as u64);
        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert_eq!(doc.checksum, format!("{:x}", md5::compute(TWO_PAGES)));
        assert_eq!(env.state.storage.read(&doc.storage_path).unwrap(), TWO_PAGES);
        assert_eq!(env.actions(), vec![actions::DOCUMENT_UPLOADED]);
    }

    #[actix_web::test]
    async fn explicit_page_count_wins() {
        let env = TestEnv::new();
        let (_, token) = env.user("prov@clinic.test", Role::Provider);
        let app = test_app!(env.state);

        let resp = test::call_service(&app, upload_request(&token, form("a.pdf", TWO_PAGES, Some("7"))).to_request()).await;
        let doc: Document = test::read_body_json(resp).await;
        assert_eq!(doc.page_count, 7);
    }

    #[actix_web::test]
    async fn rejects_non_pdf_and_non_providers() {
        let env = TestEnv::new();
        let (_, provider) = env.user("prov@clinic.test", Role::Provider);
        let (_, coder) = env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let resp = test::call_service(&app, upload_request(&provider, form("notes.txt", b"hello", None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(&app, upload_request(&coder, form("a.pdf", TWO_PAGES, None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn oversized_uploads_leave_nothing_behind() {
        let mut env = TestEnv::new();
        env.state.max_upload_bytes = 16;
        let (_, token) = env.user("prov@clinic.test", Role::Provider);
        let app = test_app!(env.state);

        let resp = test::call_service(&app, upload_request(&token, form("a.pdf", TWO_PAGES, None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let conn = env.state.connect().unwrap();
        let docs = documents::list(&conn, &Default::default()).unwrap();
        assert!(docs.is_empty());
    }
}
