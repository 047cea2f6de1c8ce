use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A PDF uploaded by a provider and coded page by page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String, // UUID
    pub provider_id: String,
    pub filename: String,
    /// Object key inside the `documents` bucket.
    pub storage_path: String,
    pub page_count: u32,
    pub byte_size: u64,
    pub status: DocumentStatus,
    /// Employee the document was handed to, set on assignment.
    pub assigned_to: Option<String>,
    /// MD5 hex digest of the uploaded bytes.
    pub checksum: String,
    pub uploaded_at: String,
}

/// Where a document sits in the coding workflow.
///
/// The usual path is
/// `UPLOADED -> ASSIGNED -> CODING_IN_PROGRESS -> CODING_COMPLETE -> UNDER_AUDIT -> APPROVED | REJECTED`
/// but the status is a plain field: any of the seven values may be written at
/// any time. `next` and `is_expected_transition` describe the usual path so
/// the UI can offer the right actions and the backend can log detours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Assigned,
    CodingInProgress,
    CodingComplete,
    UnderAudit,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 7] = [
        DocumentStatus::Uploaded,
        DocumentStatus::Assigned,
        DocumentStatus::CodingInProgress,
        DocumentStatus::CodingComplete,
        DocumentStatus::UnderAudit,
        DocumentStatus::Approved,
        DocumentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "UPLOADED",
            DocumentStatus::Assigned => "ASSIGNED",
            DocumentStatus::CodingInProgress => "CODING_IN_PROGRESS",
            DocumentStatus::CodingComplete => "CODING_COMPLETE",
            DocumentStatus::UnderAudit => "UNDER_AUDIT",
            DocumentStatus::Approved => "APPROVED",
            DocumentStatus::Rejected => "REJECTED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "Uploaded",
            DocumentStatus::Assigned => "Assigned",
            DocumentStatus::CodingInProgress => "Coding in progress",
            DocumentStatus::CodingComplete => "Coding complete",
            DocumentStatus::UnderAudit => "Under audit",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Rejected => "Rejected",
        }
    }

    /// Statuses the UI moves a document to from this one.
    pub fn next(&self) -> &'static [DocumentStatus] {
        match self {
            DocumentStatus::Uploaded => &[DocumentStatus::Assigned],
            DocumentStatus::Assigned => &[DocumentStatus::CodingInProgress],
            DocumentStatus::CodingInProgress => &[DocumentStatus::CodingComplete],
            DocumentStatus::CodingComplete => &[DocumentStatus::UnderAudit],
            DocumentStatus::UnderAudit => &[DocumentStatus::Approved, DocumentStatus::Rejected],
            DocumentStatus::Approved | DocumentStatus::Rejected => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_empty()
    }

    /// Re-writing the current status counts as expected.
    pub fn is_expected_transition(&self, to: DocumentStatus) -> bool {
        *self == to || self.next().contains(&to)
    }

    /// Whether page codes are still being edited in this status.
    pub fn is_codable(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Assigned | DocumentStatus::CodingInProgress
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("unknown document status '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usual_path_reaches_a_terminal_status() {
        let mut status = DocumentStatus::Uploaded;
        let mut steps = 0;
        while let Some(next) = status.next().first() {
            assert!(status.is_expected_transition(*next));
            status = *next;
            steps += 1;
        }
        assert_eq!(status, DocumentStatus::Approved);
        assert_eq!(steps, 5);
    }

    #[test]
    fn under_audit_branches() {
        assert!(DocumentStatus::UnderAudit.is_expected_transition(DocumentStatus::Rejected));
        assert!(DocumentStatus::UnderAudit.is_expected_transition(DocumentStatus::Approved));
        assert!(DocumentStatus::Rejected.is_terminal());
    }

    #[test]
    fn detours_are_flagged_not_forbidden() {
        assert!(!DocumentStatus::Uploaded.is_expected_transition(DocumentStatus::Approved));
        assert!(!DocumentStatus::Approved.is_expected_transition(DocumentStatus::Uploaded));
    }

    #[test]
    fn parses_only_the_seven_values() {
        for status in DocumentStatus::ALL {
            assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
        }
        assert!("ARCHIVED".parse::<DocumentStatus>().is_err());
        assert!("uploaded".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn serde_matches_as_str() {
        for status in DocumentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
