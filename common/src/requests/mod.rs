//! JSON request bodies accepted by the backend.

use crate::codes::CodeType;
use crate::model::audit::{SubmissionPayload, SubmissionStatus};
use crate::model::document::DocumentStatus;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

/// Body of the `create-user` admin function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Body of the `change-password` admin function. Admins may target any
/// profile; everybody else only their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub user_id: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDocumentRequest {
    pub employee_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    pub status: DocumentStatus,
}

/// Upsert of the caller's codes for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePageCodesRequest {
    pub document_id: String,
    pub page_number: u32,
    pub icd10_codes: Vec<String>,
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAuditRequest {
    pub document_id: String,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAuditRequest {
    pub status: SubmissionStatus,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaiseQueryRequest {
    #[serde(default)]
    pub page_number: Option<u32>,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerQueryRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateCodeRequest {
    pub code_type: CodeType,
    pub code: String,
}
