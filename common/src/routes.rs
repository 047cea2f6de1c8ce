//! Which pages each role may open.
//!
//! The frontend router asks `resolve` for every navigation; a page that is
//! not permitted for the signed-in role falls back to the role's landing page.

use crate::model::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    Upload,
    MyDocuments,
    ProviderQueries,
    CodingQueue,
    CodingWorkspace,
    AuditQueue,
    AdminUsers,
    AdminDocuments,
    AdminActivity,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Upload,
        Page::MyDocuments,
        Page::ProviderQueries,
        Page::CodingQueue,
        Page::CodingWorkspace,
        Page::AuditQueue,
        Page::AdminUsers,
        Page::AdminDocuments,
        Page::AdminActivity,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Upload => "/provider/upload",
            Page::MyDocuments => "/provider/documents",
            Page::ProviderQueries => "/provider/queries",
            Page::CodingQueue => "/coding",
            Page::CodingWorkspace => "/coding/workspace",
            Page::AuditQueue => "/audit",
            Page::AdminUsers => "/admin/users",
            Page::AdminDocuments => "/admin/documents",
            Page::AdminActivity => "/admin/activity",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Upload => "Upload",
            Page::MyDocuments => "My documents",
            Page::ProviderQueries => "Queries",
            Page::CodingQueue => "Coding queue",
            Page::CodingWorkspace => "Workspace",
            Page::AuditQueue => "Audit queue",
            Page::AdminUsers => "Users",
            Page::AdminDocuments => "Documents",
            Page::AdminActivity => "Activity",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.trim_end_matches('/');
        Page::ALL.into_iter().find(|page| page.path() == path)
    }
}

/// Pages reachable by `role`, in navigation order. The first one is the
/// landing page.
pub fn permitted_pages(role: Role) -> &'static [Page] {
    match role {
        Role::Provider => &[Page::Upload, Page::MyDocuments, Page::ProviderQueries],
        Role::Employee => &[Page::CodingQueue, Page::CodingWorkspace],
        Role::Auditor => &[Page::AuditQueue],
        Role::Admin => &[
            Page::AdminUsers,
            Page::AdminDocuments,
            Page::AdminActivity,
            Page::AuditQueue,
        ],
    }
}

pub fn landing_page(role: Role) -> Page {
    permitted_pages(role)[0]
}

pub fn is_permitted(role: Role, page: Page) -> bool {
    permitted_pages(role).contains(&page)
}

pub fn resolve(role: Role, requested: Option<Page>) -> Page {
    match requested {
        Some(page) if is_permitted(role, page) => page,
        _ => landing_page(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_belongs_to_some_role() {
        for page in Page::ALL {
            assert!(
                Role::ALL.into_iter().any(|role| is_permitted(role, page)),
                "{:?} unreachable",
                page
            );
        }
    }

    #[test]
    fn forbidden_pages_fall_back_to_landing() {
        assert_eq!(resolve(Role::Provider, Some(Page::AdminUsers)), Page::Upload);
        assert_eq!(resolve(Role::Auditor, Some(Page::CodingWorkspace)), Page::AuditQueue);
        assert_eq!(resolve(Role::Employee, None), Page::CodingQueue);
        assert_eq!(resolve(Role::Admin, Some(Page::AuditQueue)), Page::AuditQueue);
    }

    #[test]
    fn paths_round_trip_and_tolerate_trailing_slash() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
        assert_eq!(Page::from_path("/audit/"), Some(Page::AuditQueue));
        assert_eq!(Page::from_path("/nowhere"), None);
    }
}
