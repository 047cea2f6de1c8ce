//! # Page Code Service
//!
//! The coding workspace saves each page's codes here, debounced, as the coder
//! types. Rows are keyed by (document, page, caller), so saving again
//! replaces the caller's row and never touches another author's.
//!
//! Codes are normalized (trimmed, upper-cased, de-duplicated) and
//! format-checked before they are stored: the diagnosis list with the ICD-10
//! rules, the procedure list with the CPT or HCPCS rules.

use crate::access::visible_document;
use crate::auth::AuthUser;
use crate::db::page_codes;
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{self, get, put, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::codes::validator::{validate_icd10, validate_procedure};
use common::codes::ValidationResult;
use common::model::page_code::PageCode;
use common::model::role::Role;
use common::requests::SavePageCodesRequest;

const API_PATH: &str = "/api/page_codes";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", put().to(save))
        .route("/{document_id}/{page_number}", get().to(get_own))
}

/// Trims, upper-cases and de-duplicates `codes`, keeping first occurrences,
/// then checks each with `check`. All failures are reported together.
pub(crate) fn normalize_codes(
    codes: &[String],
    check: fn(&str) -> ValidationResult,
) -> Result<Vec<String>, ServiceError> {
    let mut normalized: Vec<String> = Vec::new();
    let mut problems: Vec<String> = Vec::new();

    for code in codes {
        let code = code.trim().to_uppercase();
        if code.is_empty() || normalized.contains(&code) {
            continue;
        }
        let result = check(&code);
        if result.valid {
            normalized.push(code);
        } else {
            problems.push(format!("{}: {}", code, result.message));
        }
    }

    if problems.is_empty() {
        Ok(normalized)
    } else {
        Err(ServiceError::BadRequest(problems.join("; ")))
    }
}

pub async fn save(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<SavePageCodesRequest>,
) -> impl Responder {
    match save_page_codes(&state, &user, &body) {
        Ok(code) => HttpResponse::Ok().json(code),
        Err(e) => e.error_response(),
    }
}

fn save_page_codes(
    state: &AppState,
    user: &AuthUser,
    request: &SavePageCodesRequest,
) -> Result<PageCode, ServiceError> {
    user.require(&[Role::Employee, Role::Admin])?;
    if request.page_number == 0 {
        return Err(ServiceError::bad_request("Page numbers start at 1"));
    }
    let icd10 = normalize_codes(&request.icd10_codes, validate_icd10)?;
    let procedures = normalize_codes(&request.cpt_codes, validate_procedure)?;

    let conn = state.connect()?;
    let doc = visible_document(&conn, user, &request.document_id)?;
    if !doc.status.is_codable() {
        log::warn!(
            "{} saved codes on document {} while it is {}",
            user.profile.email,
            doc.id,
            doc.status
        );
    }

    Ok(page_codes::upsert(
        &conn,
        &doc.id,
        request.page_number,
        user.id(),
        &icd10,
        &procedures,
        request.notes.trim(),
    )?)
}

/// The caller's own row for one page.
pub async fn get_own(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(String, u32)>,
) -> impl Responder {
    let (document_id, page_number) = path.into_inner();
    match find_own(&state, &user, &document_id, page_number) {
        Ok(code) => HttpResponse::Ok().json(code),
        Err(e) => e.error_response(),
    }
}

fn find_own(state: &AppState, user: &AuthUser, document_id: &str, page_number: u32) -> Result<PageCode, ServiceError> {
    let conn = state.connect()?;
    let doc = visible_document(&conn, user, document_id)?;
    page_codes::find(&conn, &doc.id, page_number, user.id())?
        .ok_or_else(|| ServiceError::not_found("page codes", format!("{} page {}", doc.id, page_number)))
}

/// `GET /api/documents/{id}/page_codes`: every author's rows, for auditors
/// and the provider's read-only view.
pub async fn list_for_document(state: web::Data<AppState>, user: AuthUser, id: web::Path<String>) -> impl Responder {
    let result = state.connect().map_err(ServiceError::from).and_then(|conn| {
        let doc = visible_document(&conn, &user, &id)?;
        Ok(page_codes::list_for_document(&conn, &doc.id)?)
    });
    match result {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[::core::prelude::v1::test]
    fn normalizes_and_deduplicates() {
        let codes = vec![" e11.9 ".to_string(), "E11.9".to_string(), "".to_string(), "i10".to_string()];
        assert_eq!(normalize_codes(&codes, validate_icd10).unwrap(), vec!["E11.9", "I10"]);
    }

    #[::core::prelude::v1::test]
    fn reports_every_invalid_code() {
        let codes = vec!["123".to_string(), "99213".to_string(), "JJ058".to_string()];
        let err = normalize_codes(&codes, validate_procedure).unwrap_err().to_string();
        assert!(err.contains("123"));
        assert!(err.contains("JJ058"));
        assert!(!err.contains("99213"));
    }

    #[actix_web::test]
    async fn save_then_fetch_is_idempotent() {
        let env = TestEnv::new();
        let (provider, _) = env.user("prov@clinic.test", Role::Provider);
        let (coder, token) = env.user("coder@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let body = json!({
            "document_id": doc.id,
            "page_number": 2,
            "icd10_codes": ["E11.9", "i10"],
            "cpt_codes": ["99213", "J0585"],
            "notes": "follow-up"
        });
        for _ in 0..2 {
            let req = test::TestRequest::put()
                .uri("/api/page_codes")
                .insert_header(bearer(&token))
                .set_json(&body)
                .to_request();
            let saved: PageCode = test::call_and_read_body_json(&app, req).await;
            assert_eq!(saved.icd10_codes, vec!["E11.9", "I10"]);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/page_codes/{}/2", doc.id))
            .insert_header(bearer(&token))
            .to_request();
        let fetched: PageCode = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.icd10_codes, vec!["E11.9", "I10"]);
        assert_eq!(fetched.cpt_codes, vec!["99213", "J0585"]);
        assert_eq!(fetched.notes, "follow-up");
        assert_eq!(fetched.author_id, coder.id);

        let req = test::TestRequest::get()
            .uri(&format!("/api/documents/{}/page_codes", doc.id))
            .insert_header(bearer(&token))
            .to_request();
        let rows: Vec<PageCode> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 1);
    }

    #[actix_web::test]
    async fn missing_page_is_not_found() {
        let env = TestEnv::new();
        let (provider, _) = env.user("prov@clinic.test", Role::Provider);
        let (coder, token) = env.user("coder@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/page_codes/{}/1", doc.id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn rejects_invalid_codes_and_unassigned_coders() {
        let env = TestEnv::new();
        let (provider, _) = env.user("prov@clinic.test", Role::Provider);
        let (coder, token) = env.user("coder@clinic.test", Role::Employee);
        let (_, stranger) = env.user("stranger@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::put()
            .uri("/api/page_codes")
            .insert_header(bearer(&token))
            .set_json(json!({
                "document_id": doc.id,
                "page_number": 1,
                "icd10_codes": ["U07.1"],
                "cpt_codes": []
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/page_codes")
            .insert_header(bearer(&stranger))
            .set_json(json!({
                "document_id": doc.id,
                "page_number": 1,
                "icd10_codes": ["E11.9"],
                "cpt_codes": []
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
