//! Pure helpers of the coding workspace: page drafts, change fingerprints
//! and the audit payload.

use crate::components::code_picker::CodeList;
use common::model::audit::{DocumentDecision, SubmissionPayload};
use common::model::page_code::{PageCode, PageCodeEntry};
use js_sys::Reflect;
use std::collections::BTreeMap;
use wasm_bindgen::JsValue;

/// The coder's working copy of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDraft {
    pub icd10_codes: Vec<String>,
    pub cpt_codes: Vec<String>,
    pub notes: String,
}

impl PageDraft {
    pub fn codes(&self, list: CodeList) -> &[String] {
        match list {
            CodeList::Diagnoses => &self.icd10_codes,
            CodeList::Procedures => &self.cpt_codes,
        }
    }

    fn codes_mut(&mut self, list: CodeList) -> &mut Vec<String> {
        match list {
            CodeList::Diagnoses => &mut self.icd10_codes,
            CodeList::Procedures => &mut self.cpt_codes,
        }
    }

    /// Returns false when the code is already on the list.
    pub fn add(&mut self, list: CodeList, code: String) -> bool {
        let codes = self.codes_mut(list);
        if codes.contains(&code) {
            return false;
        }
        codes.push(code);
        true
    }

    pub fn remove(&mut self, list: CodeList, code: &str) -> bool {
        let codes = self.codes_mut(list);
        let before = codes.len();
        codes.retain(|c| c != code);
        codes.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.icd10_codes.is_empty() && self.cpt_codes.is_empty() && self.notes.trim().is_empty()
    }

    pub fn entry(&self, page_number: u32) -> PageCodeEntry {
        PageCodeEntry {
            page_number,
            icd10_codes: self.icd10_codes.clone(),
            cpt_codes: self.cpt_codes.clone(),
            notes: self.notes.trim().to_string(),
        }
    }
}

impl From<&PageCode> for PageDraft {
    fn from(code: &PageCode) -> Self {
        Self {
            icd10_codes: code.icd10_codes.clone(),
            cpt_codes: code.cpt_codes.clone(),
            notes: code.notes.clone(),
        }
    }
}

pub fn compute_md5(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

/// Fingerprint of what a save would send for `draft`.
pub fn fingerprint(draft: &PageDraft) -> String {
    compute_md5(&format!(
        "{}\n{}\n{}",
        draft.icd10_codes.join(","),
        draft.cpt_codes.join(","),
        draft.notes.trim()
    ))
}

/// Pages whose draft differs from the last saved (or loaded) state. A page
/// that was never saved only counts once something was entered on it.
pub fn dirty_pages(drafts: &BTreeMap<u32, PageDraft>, saved: &BTreeMap<u32, String>) -> Vec<u32> {
    drafts
        .iter()
        .filter(|(page, draft)| match saved.get(*page) {
            Some(print) => *print != fingerprint(draft),
            None => !draft.is_empty(),
        })
        .map(|(page, _)| *page)
        .collect()
}

/// Audit payload of every page with content, in page order.
pub fn submission_payload(
    drafts: &BTreeMap<u32, PageDraft>,
    decision: DocumentDecision,
    reason: &str,
) -> SubmissionPayload {
    let reason = reason.trim();
    SubmissionPayload {
        pages: drafts
            .iter()
            .filter(|(_, draft)| !draft.is_empty())
            .map(|(page, draft)| draft.entry(*page))
            .collect(),
        decision,
        decision_reason: match decision {
            DocumentDecision::Reject if !reason.is_empty() => Some(reason.to_string()),
            _ => None,
        },
    }
}

/// Mirrors unsaved work into `window.app_dirty` for the unload guard.
pub fn set_window_dirty_flag(dirty: bool) {
    if let Some(window) = web_sys::window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str("app_dirty"),
            &JsValue::from_bool(dirty),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(icd: &[&str], cpt: &[&str], notes: &str) -> PageDraft {
        PageDraft {
            icd10_codes: icd.iter().map(|c| c.to_string()).collect(),
            cpt_codes: cpt.iter().map(|c| c.to_string()).collect(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn adding_twice_keeps_one_copy() {
        let mut page = PageDraft::default();
        assert!(page.add(CodeList::Diagnoses, "E11.9".to_string()));
        assert!(!page.add(CodeList::Diagnoses, "E11.9".to_string()));
        assert!(page.add(CodeList::Procedures, "99213".to_string()));
        assert_eq!(page.codes(CodeList::Diagnoses), ["E11.9"]);
        assert!(page.remove(CodeList::Procedures, "99213"));
        assert!(!page.remove(CodeList::Procedures, "99213"));
    }

    #[test]
    fn trailing_whitespace_in_notes_is_not_a_change() {
        assert_eq!(
            fingerprint(&draft(&["I10"], &[], "ok")),
            fingerprint(&draft(&["I10"], &[], "ok  "))
        );
        assert_ne!(
            fingerprint(&draft(&["I10"], &[], "")),
            fingerprint(&draft(&[], &["I10"], ""))
        );
    }

    #[test]
    fn only_changed_pages_are_dirty() {
        let mut drafts = BTreeMap::new();
        drafts.insert(1, draft(&["I10"], &[], ""));
        drafts.insert(2, PageDraft::default());
        drafts.insert(3, draft(&[], &["99213"], ""));
        let mut saved = BTreeMap::new();
        saved.insert(1, fingerprint(&draft(&["I10"], &[], "")));
        saved.insert(3, fingerprint(&PageDraft::default()));

        assert_eq!(dirty_pages(&drafts, &saved), vec![3]);
    }

    #[test]
    fn payload_skips_empty_pages_and_keeps_reject_reason_only() {
        let mut drafts = BTreeMap::new();
        drafts.insert(2, draft(&["I10"], &["99213"], " seen "));
        drafts.insert(1, PageDraft::default());

        let accepted = submission_payload(&drafts, DocumentDecision::Accept, "ignored");
        assert_eq!(accepted.pages.len(), 1);
        assert_eq!(accepted.pages[0].page_number, 2);
        assert_eq!(accepted.pages[0].notes, "seen");
        assert_eq!(accepted.decision_reason, None);

        let rejected = submission_payload(&drafts, DocumentDecision::Reject, " illegible ");
        assert_eq!(rejected.decision_reason.as_deref(), Some("illegible"));
        assert_eq!(rejected.code_count(), 2);
    }
}
