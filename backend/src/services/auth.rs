//! # Session Service
//!
//! Email and password sign-in against the `profiles` table. A successful
//! sign-in opens a row in `sessions` and returns its token, which the
//! frontend sends back as `Authorization: Bearer <token>`.

use crate::activity::actions;
use crate::auth::password::verify_password;
use crate::auth::AuthUser;
use crate::db::{profiles, sessions};
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{self, get, post, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::auth::{Session, SignInRequest};

const API_PATH: &str = "/api/auth";

/// * `POST /sign_in` with a `SignInRequest`, answers a `Session`.
/// * `POST /sign_out` ends the caller's session.
/// * `GET /session` returns the caller's session, used to restore a stored token.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/sign_in", post().to(sign_in))
        .route("/sign_out", post().to(sign_out))
        .route("/session", get().to(session))
}

pub async fn sign_in(state: web::Data<AppState>, body: web::Json<SignInRequest>) -> impl Responder {
    match open_session(&state, &body) {
        Ok(session) => HttpResponse::Ok().json(session),
        Err(e) => e.error_response(),
    }
}

fn open_session(state: &AppState, request: &SignInRequest) -> Result<Session, ServiceError> {
    let conn = state.connect()?;
    let (profile, hash) =
        profiles::find_credentials(&conn, &request.email)?.ok_or(ServiceError::InvalidCredentials)?;
    if !verify_password(&request.password, &hash) {
        log::info!("Rejected sign-in for {}", profile.email);
        return Err(ServiceError::InvalidCredentials);
    }
    if !profile.active {
        return Err(ServiceError::forbidden("This account has been deactivated"));
    }

    let token = sessions::create(&conn, &profile.id)?;
    state
        .activity
        .record(Some(&profile.id), actions::SIGN_IN, profile.email.clone());
    Ok(Session { token, profile })
}

pub async fn sign_out(state: web::Data<AppState>, user: AuthUser) -> impl Responder {
    let result = state
        .connect()
        .and_then(|conn| sessions::delete(&conn, &user.token));
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => ServiceError::from(e).error_response(),
    }
}

pub async fn session(user: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(Session {
        token: user.token,
        profile: user.profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv, PASSWORD};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use common::model::role::Role;
    use serde_json::json;

    #[actix_web::test]
    async fn sign_in_then_restore_then_sign_out() {
        let mut env = TestEnv::new();
        env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_in")
            .set_json(json!({ "email": "Coder@Clinic.test", "password": PASSWORD }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let session: Session = test::read_body_json(resp).await;
        assert_eq!(session.profile.role, Role::Employee);
        assert!(!session.is_mock());

        let req = test::TestRequest::get()
            .uri("/api/auth/session")
            .insert_header(bearer(&session.token))
            .to_request();
        let restored: Session = test::call_and_read_body_json(&app, req).await;
        assert_eq!(restored.profile.id, session.profile.id);

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_out")
            .insert_header(bearer(&session.token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri("/api/auth/session")
            .insert_header(bearer(&session.token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        assert!(env.actions().contains(&actions::SIGN_IN));
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let env = TestEnv::new();
        env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_in")
            .set_json(json!({ "email": "coder@clinic.test", "password": "nope-nope" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_in")
            .set_json(json!({ "email": "nobody@clinic.test", "password": PASSWORD }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn deactivated_accounts_cannot_sign_in() {
        let env = TestEnv::new();
        let (profile, token) = env.user("gone@clinic.test", Role::Provider);
        let conn = env.state.connect().unwrap();
        profiles::set_active(&conn, &profile.id, false).unwrap();
        let app = test_app!(env.state);

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_in")
            .set_json(json!({ "email": "gone@clinic.test", "password": PASSWORD }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/auth/session")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let env = TestEnv::new();
        let app = test_app!(env.state);
        let req = test::TestRequest::get().uri("/api/auth/session").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
