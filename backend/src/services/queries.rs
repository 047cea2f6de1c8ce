//! # Document Query Service
//!
//! Coders and auditors raise questions about a document (optionally about
//! one page); the uploading provider answers them. Queries follow the
//! visibility of their document.

use crate::access::{document_scope, visible_document};
use crate::activity::actions;
use crate::auth::AuthUser;
use crate::db::queries::{self, QueryFilter};
use crate::db::documents;
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{self, get, put, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::model::query::{DocumentQuery, QueryStatus};
use common::model::role::Role;
use common::requests::{AnswerQueryRequest, RaiseQueryRequest};
use serde::Deserialize;

const API_PATH: &str = "/api/queries";

/// `GET ?status=` lists queries across every visible document;
/// `PUT /{id}/answer` answers one. Per-document routes live under
/// `/api/documents/{id}/queries`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/{id}/answer", put().to(answer))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    status: Option<QueryStatus>,
}

pub async fn list(state: web::Data<AppState>, user: AuthUser, params: web::Query<ListParams>) -> impl Responder {
    let scope = document_scope(&user.profile);
    let filter = QueryFilter {
        provider_id: scope.provider_id,
        assigned_to: scope.assigned_to,
        status: params.status,
    };
    match state.connect().and_then(|conn| queries::list(&conn, &filter)) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => ServiceError::from(e).error_response(),
    }
}

pub async fn list_for_document(state: web::Data<AppState>, user: AuthUser, id: web::Path<String>) -> impl Responder {
    let result = state.connect().map_err(ServiceError::from).and_then(|conn| {
        let doc = visible_document(&conn, &user, &id)?;
        Ok(queries::list_for_document(&conn, &doc.id)?)
    });
    match result {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => e.error_response(),
    }
}

pub async fn raise(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<RaiseQueryRequest>,
) -> impl Responder {
    match raise_query(&state, &user, &id, &body) {
        Ok(query) => HttpResponse::Created().json(query),
        Err(e) => e.error_response(),
    }
}

fn raise_query(
    state: &AppState,
    user: &AuthUser,
    document_id: &str,
    request: &RaiseQueryRequest,
) -> Result<DocumentQuery, ServiceError> {
    user.require(&[Role::Employee, Role::Auditor])?;
    if request.question.trim().is_empty() {
        return Err(ServiceError::bad_request("The question is empty"));
    }
    if request.page_number == Some(0) {
        return Err(ServiceError::bad_request("Page numbers start at 1"));
    }

    let conn = state.connect()?;
    let doc = visible_document(&conn, user, document_id)?;
    let query = queries::insert(&conn, &doc.id, request.page_number, user.id(), &request.question)?;
    state.activity.record(
        Some(user.id()),
        actions::QUERY_RAISED,
        format!("{} on {}", query.id, doc.id),
    );
    Ok(query)
}

pub async fn answer(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<AnswerQueryRequest>,
) -> impl Responder {
    match answer_query(&state, &user, &id, &body.answer) {
        Ok(query) => HttpResponse::Ok().json(query),
        Err(e) => e.error_response(),
    }
}

/// Only the provider who uploaded the document, or an admin, answers.
fn answer_query(state: &AppState, user: &AuthUser, id: &str, answer: &str) -> Result<DocumentQuery, ServiceError> {
    user.require(&[Role::Provider, Role::Admin])?;
    if answer.trim().is_empty() {
        return Err(ServiceError::bad_request("The answer is empty"));
    }

    let conn = state.connect()?;
    let query = queries::find(&conn, id)?.ok_or_else(|| ServiceError::not_found("query", id))?;
    let doc = documents::find(&conn, &query.document_id)?
        .ok_or_else(|| ServiceError::not_found("document", &query.document_id))?;
    if !user.is(Role::Admin) && doc.provider_id != user.id() {
        return Err(ServiceError::not_found("query", id));
    }

    queries::answer(&conn, id, user.id(), answer)?;
    state
        .activity
        .record(Some(user.id()), actions::QUERY_ANSWERED, query.id.clone());
    queries::find(&conn, id)?.ok_or_else(|| ServiceError::not_found("query", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn coder_asks_provider_answers() {
        let mut env = TestEnv::new();
        let (provider, provider_token) = env.user("prov@clinic.test", Role::Provider);
        let (_, other_provider) = env.user("other@clinic.test", Role::Provider);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri(&format!("/api/documents/{}/queries", doc.id))
            .insert_header(bearer(&coder_token))
            .set_json(json!({ "page_number": 2, "question": "Which knee?" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let query: DocumentQuery = test::read_body_json(resp).await;
        assert_eq!(query.status, QueryStatus::Open);

        let req = test::TestRequest::get()
            .uri("/api/queries?status=OPEN")
            .insert_header(bearer(&provider_token))
            .to_request();
        let open: Vec<DocumentQuery> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(open.len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/queries")
            .insert_header(bearer(&other_provider))
            .to_request();
        let none: Vec<DocumentQuery> = test::call_and_read_body_json(&app, req).await;
        assert!(none.is_empty());

        let req = test::TestRequest::put()
            .uri(&format!("/api/queries/{}/answer", query.id))
            .insert_header(bearer(&other_provider))
            .set_json(json!({ "answer": "Left" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&format!("/api/queries/{}/answer", query.id))
            .insert_header(bearer(&provider_token))
            .set_json(json!({ "answer": "Left" }))
            .to_request();
        let answered: DocumentQuery = test::call_and_read_body_json(&app, req).await;
        assert_eq!(answered.status, QueryStatus::Answered);
        assert_eq!(answered.answer.as_deref(), Some("Left"));
        assert_eq!(answered.answered_by.as_deref(), Some(provider.id.as_str()));

        let req = test::TestRequest::get()
            .uri(&format!("/api/documents/{}/queries", doc.id))
            .insert_header(bearer(&coder_token))
            .to_request();
        let on_doc: Vec<DocumentQuery> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(on_doc.len(), 1);

        assert_eq!(env.actions(), vec![actions::QUERY_RAISED, actions::QUERY_ANSWERED]);
    }

    #[actix_web::test]
    async fn providers_cannot_raise_and_questions_must_not_be_blank() {
        let env = TestEnv::new();
        let (provider, provider_token) = env.user("prov@clinic.test", Role::Provider);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let doc = env.assigned_document(&provider, &coder);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri(&format!("/api/documents/{}/queries", doc.id))
            .insert_header(bearer(&provider_token))
            .set_json(json!({ "question": "Self question" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/api/documents/{}/queries", doc.id))
            .insert_header(bearer(&coder_token))
            .set_json(json!({ "question": "   " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
