//! `GET /api/documents/{id}/codes.csv`: one row per assigned code, for the
//! billing system. Codes outside the demo catalog keep an empty description.

use crate::access::visible_document;
use crate::auth::AuthUser;
use crate::db::{page_codes, profiles};
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::codes::{catalog, CodeType};
use common::model::page_code::PageCode;
use std::collections::HashMap;

const HEADER: [&str; 6] = ["page", "code_type", "code", "description", "coder", "updated_at"];

pub async fn process(state: web::Data<AppState>, user: AuthUser, id: web::Path<String>) -> impl Responder {
    match export_codes(&state, &user, &id) {
        Ok((filename, csv)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .body(csv),
        Err(e) => e.error_response(),
    }
}

fn export_codes(state: &AppState, user: &AuthUser, id: &str) -> Result<(String, Vec<u8>), ServiceError> {
    let conn = state.connect()?;
    let doc = visible_document(&conn, user, id)?;
    let rows = page_codes::list_for_document(&conn, &doc.id)?;

    let mut coders: HashMap<String, String> = HashMap::new();
    for row in &rows {
        if !coders.contains_key(&row.author_id) {
            let email = profiles::find(&conn, &row.author_id)?
                .map(|p| p.email)
                .unwrap_or_else(|| row.author_id.clone());
            coders.insert(row.author_id.clone(), email);
        }
    }

    let csv = write_csv(&rows, &coders).map_err(|e| ServiceError::Internal(format!("CSV export failed: {}", e)))?;
    let stem = doc.filename.trim_end_matches(".pdf").trim_end_matches(".PDF");
    Ok((format!("{}-codes.csv", stem), csv))
}

/// Procedure codes starting with a letter are HCPCS, the rest CPT.
fn procedure_type(code: &str) -> CodeType {
    if code.starts_with(|c: char| c.is_ascii_alphabetic()) {
        CodeType::Hcpcs
    } else {
        CodeType::Cpt
    }
}

fn write_csv(rows: &[PageCode], coders: &HashMap<String, String>) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for row in rows {
        let coder = coders.get(&row.author_id).map(String::as_str).unwrap_or(&row.author_id);
        let diagnoses = row.icd10_codes.iter().map(|c| (CodeType::Icd10, c));
        let procedures = row.cpt_codes.iter().map(|c| (procedure_type(c), c));
        for (code_type, code) in diagnoses.chain(procedures) {
            let description = catalog::describe(code).map(|e| e.description.as_str()).unwrap_or("");
            writer.write_record([
                row.page_number.to_string().as_str(),
                code_type.as_str(),
                code.as_str(),
                description,
                coder,
                row.updated_at.as_str(),
            ])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
