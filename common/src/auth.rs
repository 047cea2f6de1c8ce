//! Session payloads and the mock sign-in directory.
//!
//! The mock directory lets the frontend run when the backend cannot be
//! reached: one demo account per role, all sharing `MOCK_PASSWORD`. Mock
//! sessions carry a token starting with `MOCK_TOKEN_PREFIX` so they are never
//! mistaken for real ones.

use crate::model::profile::Profile;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

pub const MOCK_PASSWORD: &str = "demo1234";
pub const MOCK_TOKEN_PREFIX: &str = "mock-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// An authenticated session as returned by `POST /api/auth/sign_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

impl Session {
    pub fn is_mock(&self) -> bool {
        self.token.starts_with(MOCK_TOKEN_PREFIX)
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }
}

fn mock_profile(role: Role) -> Profile {
    let slug = role.as_str().to_lowercase();
    Profile {
        id: format!("{}{}", MOCK_TOKEN_PREFIX, slug),
        name: format!("Demo {}", role.label()),
        email: format!("{}@demo.local", slug),
        role,
        active: true,
        created_at: "1970-01-01T00:00:00+00:00".to_string(),
    }
}

pub fn mock_profiles() -> Vec<Profile> {
    Role::ALL.into_iter().map(mock_profile).collect()
}

/// Signs in against the mock directory. Emails match case-insensitively.
pub fn mock_sign_in(email: &str, password: &str) -> Option<Session> {
    if password != MOCK_PASSWORD {
        return None;
    }
    let email = email.trim();
    mock_profiles()
        .into_iter()
        .find(|p| p.email.eq_ignore_ascii_case(email))
        .map(|profile| Session {
            token: format!("{}{}", MOCK_TOKEN_PREFIX, profile.role.as_str().to_lowercase()),
            profile,
        })
}
