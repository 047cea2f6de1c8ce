//! User directory for the admin screens.

use crate::activity::actions;
use crate::auth::AuthUser;
use crate::db::{profiles, sessions};
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{self, get, put, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::model::profile::Profile;
use common::model::role::Role;
use common::requests::SetActiveRequest;

const API_PATH: &str = "/api/profiles";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/{id}/active", put().to(set_active))
}

pub async fn list(state: web::Data<AppState>, user: AuthUser) -> impl Responder {
    match list_profiles(&state, &user) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => e.error_response(),
    }
}

fn list_profiles(state: &AppState, user: &AuthUser) -> Result<Vec<Profile>, ServiceError> {
    user.require(&[Role::Admin])?;
    let conn = state.connect()?;
    Ok(profiles::list(&conn)?)
}

pub async fn set_active(
    state: web::Data<AppState>,
    user: AuthUser,
    id: web::Path<String>,
    body: web::Json<SetActiveRequest>,
) -> impl Responder {
    match update_active(&state, &user, &id, body.active) {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => e.error_response(),
    }
}

fn update_active(state: &AppState, user: &AuthUser, id: &str, active: bool) -> Result<Profile, ServiceError> {
    user.require(&[Role::Admin])?;
    if !active && user.id() == id {
        return Err(ServiceError::bad_request("You cannot deactivate your own account"));
    }

    let conn = state.connect()?;
    if !profiles::set_active(&conn, id, active)? {
        return Err(ServiceError::not_found("user", id));
    }
    if !active {
        sessions::delete_for_profile(&conn, id)?;
    }
    let profile = profiles::find(&conn, id)?.ok_or_else(|| ServiceError::not_found("user", id))?;
    state.activity.record(
        Some(user.id()),
        actions::USER_ACTIVATION,
        format!("{} active={}", profile.email, active),
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn directory_is_admin_only() {
        let env = TestEnv::new();
        let (_, admin) = env.user("admin@clinic.test", Role::Admin);
        let (_, provider) = env.user("prov@clinic.test", Role::Provider);
        env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let req = test::TestRequest::get()
            .uri("/api/profiles")
            .insert_header(bearer(&admin))
            .to_request();
        let all: Vec<Profile> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.len(), 3);

        let req = test::TestRequest::get()
            .uri("/api/profiles")
            .insert_header(bearer(&provider))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn deactivation_closes_sessions() {
        let mut env = TestEnv::new();
        let (admin, admin_token) = env.user("admin@clinic.test", Role::Admin);
        let (coder, coder_token) = env.user("coder@clinic.test", Role::Employee);
        let app = test_app!(env.state);

        let req = test::TestRequest::put()
            .uri(&format!("/api/profiles/{}/active", coder.id))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "active": false }))
            .to_request();
        let updated: Profile = test::call_and_read_body_json(&app, req).await;
        assert!(!updated.active);

        let req = test::TestRequest::get()
            .uri("/api/auth/session")
            .insert_header(bearer(&coder_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::put()
            .uri(&format!("/api/profiles/{}/active", admin.id))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "active": false }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        assert_eq!(env.actions(), vec![actions::USER_ACTIVATION]);
    }
}
