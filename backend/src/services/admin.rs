use crate::auth::AuthUser;
use crate::db::admin_logs;
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{self, get, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::model::admin_log::AdminLog;
use common::model::role::Role;
use serde::Deserialize;

const API_PATH: &str = "/api/admin";
const DEFAULT_LOG_LIMIT: u32 = 200;
const MAX_LOG_LIMIT: u32 = 1000;

/// `GET /logs?limit=` lists the activity log, newest first.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/logs", get().to(logs))
}

#[derive(Debug, Deserialize)]
pub struct LogParams {
    limit: Option<u32>,
}

pub async fn logs(state: web::Data<AppState>, user: AuthUser, params: web::Query<LogParams>) -> impl Responder {
    match recent_logs(&state, &user, params.limit) {
        Ok(logs) => HttpResponse::Ok().json(logs),
        Err(e) => e.error_response(),
    }
}

fn recent_logs(state: &AppState, user: &AuthUser, limit: Option<u32>) -> Result<Vec<AdminLog>, ServiceError> {
    user.require(&[Role::Admin])?;
    let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
    let conn = state.connect()?;
    Ok(admin_logs::recent(&conn, limit)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{bearer, test_app, TestEnv};
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn logs_are_admin_only() {
        let env = TestEnv::new();
        let (admin, admin_token) = env.user("admin@clinic.test", Role::Admin);
        let (_, auditor) = env.user("aud@clinic.test", Role::Auditor);
        {
            let conn = env.state.connect().unwrap();
            admin_logs::insert(&conn, Some(&admin.id), "SIGN_IN", "first").unwrap();
            admin_logs::insert(&conn, Some(&admin.id), "SIGN_IN", "second").unwrap();
        }
        let app = test_app!(env.state);

        let req = test::TestRequest::get()
            .uri("/api/admin/logs?limit=1")
            .insert_header(bearer(&admin_token))
            .to_request();
        let logs: Vec<AdminLog> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].details, "second");

        let req = test::TestRequest::get()
            .uri("/api/admin/logs")
            .insert_header(bearer(&auditor))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
