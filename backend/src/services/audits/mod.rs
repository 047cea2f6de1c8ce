//! # Audit Service Module
//!
//! Coders hand finished documents to the auditors as a submission holding a
//! snapshot of every page's codes. Auditors approve or reject each
//! submission once; the document's own status is moved by a separate call
//! from the frontend.
//!
//! ## Sub-modules:
//! - `report`: printable PDF summary of a submission.

mod report;

use crate::access::visible_document;
use crate::activity::actions;
use crate::auth::AuthUser;
use crate::db::{audits, documents};
use crate::error::ServiceError;
use crate::services::page_codes::normalize_codes;
use crate::state::AppState;
use actix_web::web::{self, get, post, put, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::codes::validator::{validate_icd10, validate_procedure};
use common::model::audit::{AuditSubmission, SubmissionPayload, SubmissionStatus};
use common::model::page_code::PageCodeEntry;
use common::model::role::Role;
use common::requests::{ReviewAuditRequest, SubmitAuditRequest};
use rusqlite::Connection;
use serde::Deserialize;

const API_PATH: &str = "/api/audits";

/// # Registered Routes:
///
/// * `POST ""` (coder): submit a document for audit, answers the `PENDING` submission.
/// * `GET "?status="`: auditors and admins see every submission, coders their own.
/// * `GET /{id}` and `GET /{id}/report` (PDF).
/// * `PUT /{id}/review` (auditor, admin): `APPROVED` or `REJECTED`, once.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(submit))
        .route("", get().to(list))
        .route("/{id}", get().to(get_one))
        .route("/{id}/review", put().to(review))
        .route("/{id}/report", get().to(report::process))
}

/// Same visibility as the document list, with coders limited to what they
/// submitted themselves.
pub(crate) fn visible_submission(conn: &Connection, user: &AuthUser, id: &str) -> Result<AuditSubmission, ServiceError> {
    let submission = audits::find(conn, id)?.ok_or_else(|| ServiceError::not_found("audit submission", id))?;
    let visible = match user.role() {
        Role::Admin | Role::Auditor => true,
        Role::Employee => submission.employee_id == user.id(),
        Role::Provider => visible_document(conn, user, &submission.document_id).is_ok(),
    };
    if visible {
        Ok(submission)
    } else {
        Err(ServiceError::not_found("audit submission", id))
    }
}

fn normalize_payload(payload: &SubmissionPayload) -> Result<SubmissionPayload, ServiceError> {
    let mut pages = Vec::with_capacity(payload.pages.len());
    for page in &payload.pages {
        if page.page_number == 0 {
            return Err(ServiceError::bad_request("Page numbers start at 1"));
        }
        pages.push(PageCodeEntry {
            page_number: page.page_number,
            icd10_codes: normalize_codes(&page.icd10_codes, validate_icd10)?,
            cpt_codes: normalize_codes(&page.cpt_codes, validate_procedure)?,
            notes: page.notes.trim().to_string(),
        });
    }
    pages.sort_by_key(|p| p.page_number);
    Ok(SubmissionPayload {
        pages,
        decision: payload.decision,
        decision_reason: payload
            .decision_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    })
}

pub async fn submit(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<SubmitAuditRequest>,
) -> impl Responder {
    match submit_for_audit(&state, &user, &body) {
        Ok(submission) => HttpResponse::Created().json(submission),
        Err(e) => e.error_response(),
    }
}

fn submit_for_audit(
    state: &AppState,
    user: &AuthUser,
    request: &SubmitAuditRequest,
) -> Result<AuditSubmission, ServiceError> {
    user.require(&[Role::Employee])?;
    let payload = normalize_payload(&request.payload)?;

    let conn = state.connect()?;
    let doc = visible_document(&conn, user, &request.document_id)?;
    let submission = audits::insert(&conn, &doc.id, user.id(), &payload)?;

    log::info!(
        "{} submitted {} ({} codes) for audit",
        user.profile.email,
        doc.filename,
        payload.code_count()
    );
    state.activity.record(
        Some(user.id()),
        actions::AUDIT_SUBMITTED,
        format!("{} ({})", doc.id, submission.id),
    );
    Ok(submission)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    status: Option<SubmissionStatus>,
}

pub async fn list(state: web::Data<AppState>, user: AuthUser, params: web::Query<ListParams>) -> impl Responder {
    match list_submissions(&state, &user, params.status) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => e.error_response(),
    }
}

fn list_submissions(
    state: &AppState,
    user: &AuthUser,
    status: Option<SubmissionStatus>,
) -> Result<Vec<AuditSubmission>, ServiceError> {
    user.require(&[Role::Employee, Role::Auditor, Role::Admin])?;
    let employee = user.is(Role::Employee).then(|| user.id());
    let conn = state.connect()?;
    Ok(audits::list(&conn, status, employee)?)
}

pub async fn get_one(state: web::Data<AppState>, user: AuthUser, id: web::Path<String>) -> impl Responder {
    let result = state
        .connect()
        .map_err(ServiceError::from)
        .and_then(|conn| visible_submission(&conn, &user, &id));
    match result {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => e.error_response(),
    }
}

pub async fn review(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<ReviewAuditRequest>,
) -> impl Responder {
    match review_submission(&state, &user, &id, &body) {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => e.error_response(),
    }
}

fn review_submission(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    request: &ReviewAuditRequest,
) -> Result<AuditSubmission, ServiceError> {
    user.require(&[Role::Auditor, Role::Admin])?;
    if request.status == SubmissionStatus::Pending {
        return Err(ServiceError::bad_request("A review must approve or reject"));
    }
    let comments = request
        .comments
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let conn = state.connect()?;
    let submission = visible_submission(&conn, user, id)?;
    if !audits::review(&conn, &submission.id, user.id(), request.status, comments)? {
        return Err(ServiceError::Conflict(format!(
            "Submission {} was already {}",
            id,
            submission.status.as_str().to_lowercase()
        )));
    }

    let filename = documents::find(&conn, &submission.document_id)?
        .map(|d| d.filename)
        .unwrap_or_else(|| submission.document_id.clone());
    log::info!("{} marked {} {}", user.profile.email, filename, request.status);
    state.activity.record(
        Some(user.id()),
        actions::AUDIT_REVIEWED,
        format!("{} {}", submission.id, request.status),
    );
    audits::find(&conn, id)?.ok_or_else(|| ServiceError::not_found("audit submission", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    fn submission_body(document_id: &str) -> Value {
        json!({
            "document_id": document_id,
            "payload": {
                "pages": [
                    { "page_number": 2, "icd10_codes": ["i10"], "cpt_codes": [], "notes": "" },
                    { "page_number": 1, "icd10_codes": ["E11.9"], "cpt_codes": ["99213"], "notes": " ok " }
                ],
                "decision": "ACCEPT"
            }
        })
    }

    #[actix_web::test]
    async fn submit_list_review_once() {
        let mut env = TestEnv::new();
        let (provider, _) = env.user("prov@clinic.test", Role::Provider);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let (_, auditor) = env.user("aud@clinic.test", Role::Auditor);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/audits")
            .insert_header(bearer(&coder_token))
            .set_json(submission_body(&doc.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let submission: AuditSubmission = test::read_body_json(resp).await;
        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.payload.pages[0].page_number, 1);
        assert_eq!(submission.payload.pages[0].notes, "ok");
        assert_eq!(submission.payload.pages[1].icd10_codes, vec!["I10"]);

        let req = test::TestRequest::get()
            .uri("/api/audits?status=PENDING")
            .insert_header(bearer(&auditor))
            .to_request();
        let pending: Vec<AuditSubmission> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(pending.len(), 1);

        let req = test::TestRequest::put()
            .uri(&format!("/api/audits/{}/review", submission.id))
            .insert_header(bearer(&auditor))
            .set_json(json!({ "status": "APPROVED", "comments": "  Looks right " }))
            .to_request();
        let reviewed: AuditSubmission = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reviewed.status, SubmissionStatus::Approved);
        assert_eq!(reviewed.comments.as_deref(), Some("Looks right"));
        assert!(reviewed.reviewed_at.is_some());

        let req = test::TestRequest::put()
            .uri(&format!("/api/audits/{}/review", submission.id))
            .insert_header(bearer(&auditor))
            .set_json(json!({ "status": "REJECTED" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        assert_eq!(env.actions(), vec![actions::AUDIT_SUBMITTED, actions::AUDIT_REVIEWED]);
    }

    #[actix_web::test]
    async fn coders_only_see_their_own_submissions() {
        let env = TestEnv::new();
        let (provider, provider_token) = env.user("prov@clinic.test", Role::Provider);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let (_, other_token) = env.user("other@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/audits")
            .insert_header(bearer(&coder_token))
            .set_json(submission_body(&doc.id))
            .to_request();
        let submission: AuditSubmission = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/audits")
            .insert_header(bearer(&other_token))
            .to_request();
        let theirs: Vec<AuditSubmission> = test::call_and_read_body_json(&app, req).await;
        assert!(theirs.is_empty());

        let req = test::TestRequest::get()
            .uri(&format!("/api/audits/{}", submission.id))
            .insert_header(bearer(&other_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/audits/{}", submission.id))
            .insert_header(bearer(&provider_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/audits")
            .insert_header(bearer(&provider_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn coders_cannot_review_and_pending_is_not_a_verdict() {
        let env = TestEnv::new();
        let (provider, _) = env.user("prov@clinic.test", Role::Provider);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let (_, admin) = env.user("admin@clinic.test", Role::Admin);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/audits")
            .insert_header(bearer(&coder_token))
            .set_json(submission_body(&doc.id))
            .to_request();
        let submission: AuditSubmission = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/audits/{}/review", submission.id))
            .insert_header(bearer(&coder_token))
            .set_json(json!({ "status": "APPROVED" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&format!("/api/audits/{}/review", submission.id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "status": "PENDING" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn invalid_codes_block_submission() {
        let env = TestEnv::new();
        let (provider, _) = env.user("prov@clinic.test", Role::Provider);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let mut body = submission_body(&doc.id);
        body["payload"]["pages"][0]["cpt_codes"] = json!(["123"]);
        let req = test::TestRequest::post()
            .uri("/api/audits")
            .insert_header(bearer(&coder_token))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
