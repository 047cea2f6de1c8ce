//! Code lookups backed by the built-in catalog: autocomplete and format
//! validation. Both are pure functions from `common::codes`; the frontend
//! calls them locally too, the endpoints exist for other clients.

use crate::auth::AuthUser;
use crate::error::ServiceError;
use actix_web::web::{self, get, post, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::codes::{autocomplete, validator, CodeType};
use common::requests::ValidateCodeRequest;
use serde::Deserialize;

const API_PATH: &str = "/api/codes";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/search", get().to(search))
        .route("/validate", post().to(validate))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(rename = "type")]
    code_type: String,
}

pub async fn search(_user: AuthUser, params: web::Query<SearchParams>) -> impl Responder {
    match params.code_type.parse::<CodeType>() {
        Ok(code_type) => HttpResponse::Ok().json(autocomplete::search(&params.q, code_type)),
        Err(e) => ServiceError::bad_request(e).error_response(),
    }
}

pub async fn validate(_user: AuthUser, body: web::Json<ValidateCodeRequest>) -> impl Responder {
    HttpResponse::Ok().json(validator::validate(body.code_type, &body.code))
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use common::codes::{CodeEntry, ValidationResult};
    use common::model::role::Role;
    use serde_json::json;

    #[actix_web::test]
    async fn search_filters_by_type() {
        let env = TestEnv::new();
        let (_, token) = env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let req = test::TestRequest::get()
            .uri("/api/codes/search?q=99&type=CPT")
            .insert_header(bearer(&token))
            .to_request();
        let entries: Vec<CodeEntry> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entries.len(), 10);
        assert!(entries.iter().all(|e| e.code.contains("99") || e.description.contains("99")));

        let req = test::TestRequest::get()
            .uri("/api/codes/search?q=99&type=SNOMED")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn validate_reports_format_errors() {
        let env = TestEnv::new();
        let (_, token) = env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/codes/validate")
            .insert_header(bearer(&token))
            .set_json(json!({ "code_type": "ICD10", "code": "E11.9" }))
            .to_request();
        let result: ValidationResult = test::call_and_read_body_json(&app, req).await;
        assert!(result.valid);

        let req = test::TestRequest::post()
            .uri("/api/codes/validate")
            .insert_header(bearer(&token))
            .set_json(json!({ "code_type": "CPT", "code": "12" }))
            .to_request();
        let result: ValidationResult = test::call_and_read_body_json(&app, req).await;
        assert!(!result.valid);
    }
}
