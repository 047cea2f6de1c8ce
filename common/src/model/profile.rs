use crate::model::role::Role;
use serde::{Deserialize, Serialize};

/// A user of the application. Credentials never leave the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String, // UUID
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
}
