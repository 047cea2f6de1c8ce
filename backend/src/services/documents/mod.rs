//! # Document Service Module
//!
//! Routes under `/api/documents`. Every lookup goes through
//! `access::visible_document`, so a document outside the caller's scope
//! answers `404` exactly like a missing one.
//!
//! ## Sub-modules:
//! - `upload`: multipart upload of a provider's PDF into the `documents` bucket.
//! - `export`: the per-code CSV billing export.

mod export;
mod upload;

use crate::access::{document_scope, visible_document};
use crate::activity::actions;
use crate::auth::AuthUser;
use crate::db::{documents, profiles};
use crate::error::ServiceError;
use crate::services::{page_codes, queries};
use crate::state::AppState;
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{self, get, post, put, scope};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError, Scope};
use common::model::document::{Document, DocumentStatus};
use common::model::role::Role;
use common::requests::{AssignDocumentRequest, SetStatusRequest};
use serde::Deserialize;

const API_PATH: &str = "/api/documents";

/// # Registered Routes:
///
/// * `GET ?status=`: documents visible to the caller, newest first.
/// * `POST /upload`: see `upload::process`.
/// * `GET /{id}`, `GET /{id}/file`, `GET /{id}/codes.csv`.
/// * `PUT /{id}/assign` (admin) and `PUT /{id}/status`.
/// * `GET /{id}/page_codes`: every author's codes for the document.
/// * `GET|POST /{id}/queries`: provider queries attached to the document.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/upload", post().to(upload::process))
        .route("/{id}", get().to(get_one))
        .route("/{id}/file", get().to(file))
        .route("/{id}/codes.csv", get().to(export::process))
        .route("/{id}/assign", put().to(assign))
        .route("/{id}/status", put().to(set_status))
        .route("/{id}/page_codes", get().to(page_codes::list_for_document))
        .route("/{id}/queries", get().to(queries::list_for_document))
        .route("/{id}/queries", post().to(queries::raise))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    status: Option<DocumentStatus>,
}

pub async fn list(state: web::Data<AppState>, user: AuthUser, params: web::Query<ListParams>) -> impl Responder {
    let mut filter = document_scope(&user.profile);
    filter.status = params.status;
    let result = state
        .connect()
        .and_then(|conn| documents::list(&conn, &filter));
    match result {
        Ok(docs) => HttpResponse::Ok().json(docs),
        Err(e) => ServiceError::from(e).error_response(),
    }
}

pub async fn get_one(state: web::Data<AppState>, user: AuthUser, id: web::Path<String>) -> impl Responder {
    match state
        .connect()
        .map_err(ServiceError::from)
        .and_then(|conn| visible_document(&conn, &user, &id))
    {
        Ok(doc) => HttpResponse::Ok().json(doc),
        Err(e) => e.error_response(),
    }
}

/// Streams the stored PDF inline, under its original filename.
pub async fn file(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
) -> impl Responder {
    match open_file(&state, &user, &id) {
        Ok(named) => named.into_response(&req),
        Err(e) => e.error_response(),
    }
}

fn open_file(state: &AppState, user: &AuthUser, id: &str) -> Result<NamedFile, ServiceError> {
    let conn = state.connect()?;
    let doc = visible_document(&conn, user, id)?;
    let path = state.storage.resolve(&doc.storage_path)?;
    let named = NamedFile::open(path)?.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Inline,
        parameters: vec![DispositionParam::Filename(doc.filename)],
    });
    Ok(named)
}

pub async fn assign(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<AssignDocumentRequest>,
) -> impl Responder {
    match assign_document(&state, &user, &id, &body.employee_id) {
        Ok(doc) => HttpResponse::Ok().json(doc),
        Err(e) => e.error_response(),
    }
}

fn assign_document(state: &AppState, user: &AuthUser, id: &str, employee_id: &str) -> Result<Document, ServiceError> {
    user.require(&[Role::Admin])?;
    let conn = state.connect()?;

    let employee = profiles::find(&conn, employee_id)?
        .filter(|p| p.role == Role::Employee && p.active)
        .ok_or_else(|| ServiceError::bad_request(format!("'{}' is not an active coder", employee_id)))?;
    if !documents::assign(&conn, id, &employee.id)? {
        return Err(ServiceError::not_found("document", id));
    }

    log::info!("Document {} assigned to {}", id, employee.email);
    state.activity.record(
        Some(user.id()),
        actions::DOCUMENT_ASSIGNED,
        format!("{} -> {}", id, employee.email),
    );
    documents::find(&conn, id)?.ok_or_else(|| ServiceError::not_found("document", id))
}

pub async fn set_status(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<SetStatusRequest>,
) -> impl Responder {
    match change_status(&state, &user, &id, body.status) {
        Ok(doc) => HttpResponse::Ok().json(doc),
        Err(e) => e.error_response(),
    }
}

/// Any of the seven statuses may be written; moves off the usual path are
/// logged, not refused.
fn change_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    status: DocumentStatus,
) -> Result<Document, ServiceError> {
    user.require(&[Role::Employee, Role::Auditor, Role::Admin])?;
    let conn = state.connect()?;
    let mut doc = visible_document(&conn, user, id)?;

    if !doc.status.is_expected_transition(status) {
        log::warn!(
            "Document {} moved off the usual path by {}: {} -> {}",
            id,
            user.profile.email,
            doc.status,
            status
        );
    }
    documents::set_status(&conn, id, status)?;
    state.activity.record(
        Some(user.id()),
        actions::STATUS_CHANGED,
        format!("{}: {} -> {}", id, doc.status, status),
    );
    doc.status = status;
    Ok(doc)
}
