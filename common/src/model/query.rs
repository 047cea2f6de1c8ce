use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A question a coder or auditor raises with the provider about a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub id: String, // UUID
    pub document_id: String,
    /// `None` when the question concerns the whole document.
    pub page_number: Option<u32>,
    pub raised_by: String,
    pub question: String,
    pub answer: Option<String>,
    pub answered_by: Option<String>,
    pub status: QueryStatus,
    pub created_at: String,
    pub answered_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Open,
    Answered,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Open => "OPEN",
            QueryStatus::Answered => "ANSWERED",
        }
    }
}

impl FromStr for QueryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OPEN" => Ok(QueryStatus::Open),
            "ANSWERED" => Ok(QueryStatus::Answered),
            other => Err(format!("unknown query status '{}'", other)),
        }
    }
}
