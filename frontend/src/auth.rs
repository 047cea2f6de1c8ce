//! Session handling for the SPA.
//!
//! The signed-in session lives in `localStorage` so a reload keeps the user
//! signed in. When the backend cannot be reached at all, sign-in falls back
//! to the demo directory in `common::auth`; a rejected password never does.

use crate::api::{self, ApiError};
use common::auth::{mock_sign_in, Session};
use gloo_console::{log, warn};
use web_sys::Storage;

const STORAGE_KEY: &str = "medcode.session";

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub fn load() -> Option<Session> {
    let raw = local_storage()?.get_item(STORAGE_KEY).ok()??;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(format!("Discarding stored session: {}", e));
            clear();
            None
        }
    }
}

pub fn store(session: &Session) {
    if let (Some(storage), Ok(raw)) = (local_storage(), serde_json::to_string(session)) {
        let _ = storage.set_item(STORAGE_KEY, &raw);
    }
}

pub fn clear() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(STORAGE_KEY);
    }
}

/// What to do with a failed sign-in attempt.
pub fn fallback(error: &ApiError, email: &str, password: &str) -> Option<Session> {
    if error.is_network() {
        mock_sign_in(email, password)
    } else {
        None
    }
}

pub async fn sign_in(email: &str, password: &str) -> Result<Session, String> {
    match api::sign_in(email, password).await {
        Ok(session) => {
            store(&session);
            Ok(session)
        }
        Err(error) => match fallback(&error, email, password) {
            Some(session) => {
                log!(format!("Backend unreachable, signed in as demo {}", session.role()));
                store(&session);
                Ok(session)
            }
            None => Err(match error {
                ApiError::Status(401, _) => "Invalid email or password".to_string(),
                other => other.to_string(),
            }),
        },
    }
}

/// Checks a stored session against the backend. Mock sessions and network
/// failures keep the stored copy; a rejected token clears it.
pub async fn revalidate(session: Session) -> Option<Session> {
    if session.is_mock() {
        return Some(session);
    }
    match api::current_session(&session).await {
        Ok(fresh) => {
            store(&fresh);
            Some(fresh)
        }
        Err(ApiError::Status(401, _)) | Err(ApiError::Status(403, _)) => {
            clear();
            None
        }
        Err(_) => Some(session),
    }
}

pub async fn sign_out(session: &Session) {
    if let Err(e) = api::sign_out(session).await {
        if e != ApiError::Offline {
            warn!(format!("Sign-out failed: {}", e));
        }
    }
    clear();
}
