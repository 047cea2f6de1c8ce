//! # Administrative Functions
//!
//! Privileged account operations that need the password hasher and so never
//! run in the browser:
//!
//! * `POST /create-user`: admins create an account of any role. A taken email
//!   answers `409 Conflict`, a weak password `400 Bad Request`.
//! * `POST /change-password`: admins reset anybody's password, other users
//!   only their own. Every other session of the target account is closed;
//!   the session making the request stays open.

use crate::activity::actions;
use crate::auth::password::{check_strength, hash_password};
use crate::auth::AuthUser;
use crate::db::{profiles, sessions};
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::web::{self, post, scope};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::model::profile::Profile;
use common::model::role::Role;
use common::requests::{ChangePasswordRequest, CreateUserRequest};

const API_PATH: &str = "/api/functions";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/create-user", post().to(create_user))
        .route("/change-password", post().to(change_password))
}

pub async fn create_user(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CreateUserRequest>,
) -> impl Responder {
    match insert_user(&state, &user, &body) {
        Ok(profile) => HttpResponse::Created().json(profile),
        Err(e) => e.error_response(),
    }
}

fn insert_user(state: &AppState, user: &AuthUser, request: &CreateUserRequest) -> Result<Profile, ServiceError> {
    user.require(&[Role::Admin])?;

    let email = request.email.trim();
    if request.name.trim().is_empty() {
        return Err(ServiceError::bad_request("Name is required"));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ServiceError::bad_request(format!("'{}' is not an email address", email)));
    }
    check_strength(&request.password).map_err(ServiceError::BadRequest)?;

    let conn = state.connect()?;
    let profile = profiles::insert(
        &conn,
        &request.name,
        email,
        request.role,
        &hash_password(&request.password),
    )?;
    log::info!("Created {} account {}", profile.role, profile.email);
    state.activity.record(
        Some(user.id()),
        actions::USER_CREATED,
        format!("{} ({})", profile.email, profile.role),
    );
    Ok(profile)
}

pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
) -> impl Responder {
    match update_password(&state, &user, &body) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

fn update_password(state: &AppState, user: &AuthUser, request: &ChangePasswordRequest) -> Result<(), ServiceError> {
    if !user.is(Role::Admin) && user.id() != request.user_id {
        return Err(ServiceError::forbidden("Only administrators may change other users' passwords"));
    }
    check_strength(&request.new_password).map_err(ServiceError::BadRequest)?;

    let conn = state.connect()?;
    if !profiles::set_password_hash(&conn, &request.user_id, &hash_password(&request.new_password))? {
        return Err(ServiceError::not_found("user", &request.user_id));
    }
    let closed = sessions::delete_others(&conn, &request.user_id, &user.token)?;
    log::info!("Password changed for {}, {} session(s) closed", request.user_id, closed);
    state
        .activity
        .record(Some(user.id()), actions::PASSWORD_CHANGED, request.user_id.clone());
    Ok(())
}
