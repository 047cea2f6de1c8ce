use serde::{Deserialize, Serialize};

/// The codes one author assigned to one page of a document.
///
/// There is at most one row per (`document_id`, `page_number`, `author_id`);
/// saving again replaces the lists and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCode {
    pub document_id: String,
    pub page_number: u32,
    pub icd10_codes: Vec<String>,
    /// CPT and HCPCS procedure codes.
    pub cpt_codes: Vec<String>,
    pub notes: String,
    pub author_id: String,
    pub updated_at: String,
}

impl PageCode {
    pub fn is_empty(&self) -> bool {
        self.icd10_codes.is_empty() && self.cpt_codes.is_empty() && self.notes.trim().is_empty()
    }
}

/// Page codes as embedded in an audit submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCodeEntry {
    pub page_number: u32,
    pub icd10_codes: Vec<String>,
    pub cpt_codes: Vec<String>,
    pub notes: String,
}

impl From<&PageCode> for PageCodeEntry {
    fn from(code: &PageCode) -> Self {
        Self {
            page_number: code.page_number,
            icd10_codes: code.icd10_codes.clone(),
            cpt_codes: code.cpt_codes.clone(),
            notes: code.notes.clone(),
        }
    }
}
