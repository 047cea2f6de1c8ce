//! Row visibility, the equivalent of the row-level security policies.
//!
//! Providers see their own uploads, employees the documents assigned to
//! them, auditors and admins everything. Rows outside a caller's scope
//! behave as if they did not exist.

use crate::auth::AuthUser;
use crate::db::documents::{self, DocumentFilter};
use crate::error::ServiceError;
use common::model::document::Document;
use common::model::profile::Profile;
use common::model::role::Role;
use rusqlite::Connection;

pub fn can_view_document(profile: &Profile, doc: &Document) -> bool {
    match profile.role {
        Role::Admin | Role::Auditor => true,
        Role::Provider => doc.provider_id == profile.id,
        Role::Employee => doc.assigned_to.as_deref() == Some(profile.id.as_str()),
    }
}

/// The list filter matching `can_view_document`.
pub fn document_scope(profile: &Profile) -> DocumentFilter {
    match profile.role {
        Role::Admin | Role::Auditor => DocumentFilter::default(),
        Role::Provider => DocumentFilter {
            provider_id: Some(profile.id.clone()),
            ..Default::default()
        },
        Role::Employee => DocumentFilter {
            assigned_to: Some(profile.id.clone()),
            ..Default::default()
        },
    }
}

pub fn visible_document(conn: &Connection, user: &AuthUser, id: &str) -> Result<Document, ServiceError> {
    documents::find(conn, id)?
        .filter(|doc| can_view_document(&user.profile, doc))
        .ok_or_else(|| ServiceError::not_found("document", id))
}
