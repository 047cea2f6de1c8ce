//! Runtime state of the coding workspace.

use super::helpers::{dirty_pages, PageDraft};
use common::model::audit::DocumentDecision;
use common::model::document::Document;
use common::model::query::DocumentQuery;
use std::collections::BTreeMap;
use yew::NodeRef;

pub struct CodingWorkspace {
    pub document: Option<Document>,
    pub load_error: Option<String>,

    /// Drafts keyed by page number; a page gets one on first visit.
    pub drafts: BTreeMap<u32, PageDraft>,
    /// Fingerprint of each page at its last successful save or load.
    pub saved: BTreeMap<u32, String>,
    pub current_page: u32,

    /// Bumped on every edit; a debounce tick for an older generation is stale.
    pub edit_generation: u64,
    pub saves_in_flight: usize,

    pub queries: Vec<DocumentQuery>,
    pub query_draft: String,
    pub query_for_page: bool,

    pub submit_ref: NodeRef,
    pub decision: DocumentDecision,
    pub reason: String,
    pub submitting: bool,
}

impl CodingWorkspace {
    pub fn new() -> Self {
        Self {
            document: None,
            load_error: None,
            drafts: BTreeMap::new(),
            saved: BTreeMap::new(),
            current_page: 1,
            edit_generation: 0,
            saves_in_flight: 0,
            queries: Vec::new(),
            query_draft: String::new(),
            query_for_page: true,
            submit_ref: NodeRef::default(),
            decision: DocumentDecision::Accept,
            reason: String::new(),
            submitting: false,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map(|d| d.page_count.max(1)).unwrap_or(1)
    }

    /// Coding is open while the document is ASSIGNED or CODING_IN_PROGRESS.
    pub fn editable(&self) -> bool {
        !self.submitting && self.document.as_ref().is_some_and(|d| d.status.is_codable())
    }

    pub fn current_draft(&self) -> PageDraft {
        self.drafts.get(&self.current_page).cloned().unwrap_or_default()
    }

    pub fn current_draft_mut(&mut self) -> &mut PageDraft {
        self.drafts.entry(self.current_page).or_default()
    }

    pub fn dirty_pages(&self) -> Vec<u32> {
        dirty_pages(&self.drafts, &self.saved)
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_pages().is_empty()
    }
}
