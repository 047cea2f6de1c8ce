//! Bearer-token authentication and role checks.
//!
//! Handlers that need a signed-in caller take an `AuthUser` argument; the
//! extractor resolves the `Authorization: Bearer <token>` header against the
//! `sessions` table and rejects deactivated accounts.

pub mod password;

use crate::db::{profiles, sessions, StoreError};
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use common::model::profile::Profile;
use common::model::role::Role;
use futures_util::future::{ready, Ready};
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub profile: Profile,
    pub token: String,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn is(&self, role: Role) -> bool {
        self.profile.role == role
    }

    /// Fails with 403 unless the caller has one of `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<(), ServiceError> {
        if roles.contains(&self.profile.role) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(format!(
                "{} accounts may not perform this action",
                self.profile.role.label()
            )))
        }
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ServiceError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ServiceError::Internal("application state is not configured".into()))?;
    let token = bearer_token(req).ok_or(ServiceError::Unauthorized)?;

    let conn = state.connect()?;
    let profile = sessions::find_profile(&conn, token)?.ok_or(ServiceError::Unauthorized)?;
    if !profile.active {
        return Err(ServiceError::forbidden("This account has been deactivated"));
    }
    Ok(AuthUser {
        profile,
        token: token.to_string(),
    })
}

impl FromRequest for AuthUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Creates the first administrator when no profile exists yet. Returns the
/// new profile, or `None` when accounts are already present.
pub fn bootstrap_admin(conn: &Connection, email: &str, password: &str) -> Result<Option<Profile>, StoreError> {
    if profiles::count(conn)? > 0 {
        return Ok(None);
    }
    let profile = profiles::insert(
        conn,
        "Administrator",
        email,
        Role::Admin,
        &password::hash_password(password),
    )?;
    Ok(Some(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;

    #[test]
    fn bootstrap_only_runs_on_an_empty_directory() {
        let (_dir, _path, conn) = temp_database();
        let admin = bootstrap_admin(&conn, "root@clinic.test", "first-pass").unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        let (_, hash) = profiles::find_credentials(&conn, "root@clinic.test").unwrap().unwrap();
        assert!(password::verify_password("first-pass", &hash));

        assert!(bootstrap_admin(&conn, "second@clinic.test", "other-pass").unwrap().is_none());
        assert_eq!(profiles::count(&conn).unwrap(), 1);
    }
}
