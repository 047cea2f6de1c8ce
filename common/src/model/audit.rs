use crate::model::page_code::PageCodeEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coded document handed to the auditors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSubmission {
    pub id: String, // UUID
    pub document_id: String,
    pub employee_id: String,
    pub payload: SubmissionPayload,
    pub status: SubmissionStatus,
    pub comments: Option<String>,
    pub auditor_id: Option<String>,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
}

/// Snapshot of the coder's work, stored as a JSON blob alongside the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub pages: Vec<PageCodeEntry>,
    /// The coder's verdict on the document as a whole.
    pub decision: DocumentDecision,
    #[serde(default)]
    pub decision_reason: Option<String>,
}

impl SubmissionPayload {
    pub fn code_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.icd10_codes.len() + p.cpt_codes.len())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PENDING" => Ok(SubmissionStatus::Pending),
            "APPROVED" => Ok(SubmissionStatus::Approved),
            "REJECTED" => Ok(SubmissionStatus::Rejected),
            other => Err(format!("unknown submission status '{}'", other)),
        }
    }
}
